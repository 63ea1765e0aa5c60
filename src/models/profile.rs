use super::types::UtcDateTime;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ProfileId(pub u64);

/// A registered contributor. Payments can only be issued to emails that
/// resolve to a profile.
#[derive(Clone, Debug, PartialEq)]
pub struct Profile {
    pub id: ProfileId,
    pub email: String,
    pub created_at: UtcDateTime,
}
