use rust_decimal::Decimal;

use crate::models::ClipCategory;

/// Per-thousand-views payout rates plus the per-submission cap.
///
/// Rates have been revised several times, so they live in configuration and
/// are handed in at construction instead of being baked into call sites.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RateTable {
    shorts_per_thousand: Decimal,
    long_form_per_thousand: Decimal,
    cap: Decimal,
}

impl RateTable {
    pub fn new(
        shorts_per_thousand: Decimal,
        long_form_per_thousand: Decimal,
        cap: Decimal,
    ) -> RateTable {
        RateTable {
            shorts_per_thousand,
            long_form_per_thousand,
            cap,
        }
    }

    pub fn per_thousand(&self, category: ClipCategory) -> Decimal {
        match category {
            ClipCategory::Shorts => self.shorts_per_thousand,
            ClipCategory::LongForm => self.long_form_per_thousand,
        }
    }

    /// Prices a view count at submission-create or view-count-edit time.
    ///
    /// Never fails: uncategorized clips price at zero, and everything else
    /// is rounded to cents and clamped to the cap.
    pub fn amount_for(&self, view_count: u64, category: Option<ClipCategory>) -> Decimal {
        let Some(category) = category else {
            return Decimal::ZERO;
        };

        let raw = Decimal::from(view_count) / Decimal::from(1000) * self.per_thousand(category);

        raw.round_dp(2).min(self.cap)
    }
}
