use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::models::{ContributorSummary, Payment, Submission, SubmissionId};

/// Reconciles the current submissions against the full payment history and
/// returns one summary per contributor, sorted by pending payment
/// (largest first).
///
/// Pure function of its inputs: no I/O, no clock, no hidden state. Callers
/// hand in snapshots of both stores.
///
/// Payments record the view total that was pending when they were issued.
/// Because admins keep editing view counts afterwards (and covered
/// submissions may have been deleted since), a payment's recorded total may
/// no longer match the covered submissions' current views. When the totals
/// match exactly, the payment fully covers each submission's current views.
/// When they differ, the recorded total is redistributed across the covered
/// submissions in proportion to their share of the group's *current* views.
/// The equal-split rule that briefly existed for this case was dropped; the
/// proportional rule is the policy and is pinned by the tests below.
pub fn reconcile(submissions: &[Submission], payments: &[Payment]) -> Vec<ContributorSummary> {
    let by_id: HashMap<SubmissionId, &Submission> =
        submissions.iter().map(|s| (s.id, s)).collect();

    // Views covered by prior payments, accumulated per submission. A
    // submission can appear in several payments' covered sets.
    let mut paid_views: HashMap<SubmissionId, Decimal> = HashMap::new();

    for payment in payments {
        // Covered submissions deleted since the payment was issued simply
        // drop out of the distribution base.
        let covered: Vec<&Submission> = payment
            .submission_ids
            .iter()
            .filter_map(|id| by_id.get(id).copied())
            .collect();

        let current_total: u64 = covered.iter().map(|s| s.view_count).sum();
        if current_total == 0 {
            continue;
        }

        if current_total == payment.total_views {
            // Exact match: full attribution of each submission's current views.
            for submission in &covered {
                *paid_views.entry(submission.id).or_default() +=
                    Decimal::from(submission.view_count);
            }
        } else {
            let recorded = Decimal::from(payment.total_views);
            let base = Decimal::from(current_total);
            for submission in &covered {
                let share = Decimal::from(submission.view_count) / base;
                *paid_views.entry(submission.id).or_default() += recorded * share;
            }
        }
    }

    let mut summaries: HashMap<&str, ContributorSummary> = HashMap::new();

    for submission in submissions {
        // Ownerless submissions never appear in summaries.
        let Some(email) = submission.owner_email.as_deref() else {
            continue;
        };

        let current = Decimal::from(submission.view_count);
        let paid = paid_views
            .get(&submission.id)
            .copied()
            .unwrap_or(Decimal::ZERO);
        let pending_views = (current - paid).max(Decimal::ZERO);

        // The unit rate comes from the amount recorded on the submission,
        // not from the rate table, so a later rate change does not silently
        // reprice already-recorded amounts. Zero-view submissions earn a
        // zero rate regardless of their recorded amount.
        let rate = if submission.view_count > 0 {
            submission.payment_amount / current
        } else {
            Decimal::ZERO
        };

        let summary = summaries
            .entry(email)
            .or_insert_with(|| ContributorSummary::empty(email.to_owned()));

        summary.total_views += submission.view_count;
        summary.total_payment_potential += submission.payment_amount;
        summary.paid_amount += paid * rate;
        summary.pending_payment += pending_views * rate;
        summary.pending_views += pending_views;
        summary.submission_ids.push(submission.id);
        if pending_views > Decimal::ZERO {
            summary.pending_submission_ids.push(submission.id);
        }
    }

    let mut summaries: Vec<ContributorSummary> = summaries
        .into_values()
        .map(|mut summary| {
            summary.paid_amount = summary.paid_amount.round_dp(2);
            summary.pending_payment = summary.pending_payment.round_dp(2);
            summary
        })
        .collect();

    // Ties are broken by email only to keep repeated passes identical.
    summaries.sort_by(|a, b| {
        b.pending_payment
            .cmp(&a.pending_payment)
            .then_with(|| a.email.cmp(&b.email))
    });

    summaries
}

#[cfg(test)]
mod tests {
    use map_macro::map;
    use rust_decimal::Decimal;

    use crate::models::{
        types::UtcDateTime, ClipCategory, Payment, PaymentId, PaymentStatus, ProfileId,
        Submission, SubmissionId,
    };

    use super::reconcile;

    fn submission(id: u64, owner: Option<&str>, views: u64, amount_cents: i64) -> Submission {
        Submission {
            id: SubmissionId(id),
            owner_email: owner.map(str::to_owned),
            link: None,
            file_path: None,
            view_count: views,
            payment_amount: Decimal::new(amount_cents, 2),
            category: Some(ClipCategory::Shorts),
            created_at: UtcDateTime::now(),
        }
    }

    fn payment(id: u64, owner: &str, total_views: u64, covers: &[u64]) -> Payment {
        Payment {
            id: PaymentId(id),
            profile_id: ProfileId(1),
            owner_email: owner.to_owned(),
            total_views,
            amount: Decimal::ZERO,
            submission_ids: covers.iter().map(|&id| SubmissionId(id)).collect(),
            status: PaymentStatus::Pending,
            created_at: UtcDateTime::now(),
            paid_date: None,
        }
    }

    #[test]
    fn unpaid_submission_is_fully_pending() {
        let submissions = [submission(1, Some("a@x.com"), 2000, 100)];

        let summaries = reconcile(&submissions, &[]);

        assert_eq!(summaries.len(), 1);
        let summary = &summaries[0];
        assert_eq!(summary.email, "a@x.com");
        assert_eq!(summary.total_views, 2000);
        assert_eq!(summary.paid_amount, Decimal::ZERO);
        assert_eq!(summary.pending_payment, Decimal::new(100, 2));
        assert_eq!(summary.pending_submission_ids, vec![SubmissionId(1)]);
    }

    #[test]
    fn exact_snapshot_match_fully_covers_current_views() {
        let submissions = [submission(1, Some("a@x.com"), 2000, 100)];
        let payments = [payment(1, "a@x.com", 2000, &[1])];

        let summaries = reconcile(&submissions, &payments);

        let summary = &summaries[0];
        assert_eq!(summary.paid_amount, Decimal::new(100, 2));
        assert_eq!(summary.pending_payment, Decimal::ZERO);
        assert_eq!(summary.pending_views, Decimal::ZERO);
        assert!(summary.pending_submission_ids.is_empty());
    }

    #[test]
    fn exact_match_attributes_current_views_not_proportions() {
        // Two submissions, views edited since issuance but the group total
        // still matches the recorded snapshot: each submission is treated as
        // fully covered at its current count.
        let submissions = [
            submission(1, Some("a@x.com"), 1500, 75),
            submission(2, Some("a@x.com"), 500, 25),
        ];
        let payments = [payment(1, "a@x.com", 2000, &[1, 2])];

        let summaries = reconcile(&submissions, &payments);

        let summary = &summaries[0];
        assert_eq!(summary.pending_views, Decimal::ZERO);
        assert_eq!(summary.pending_payment, Decimal::ZERO);
        assert_eq!(summary.paid_amount, Decimal::new(100, 2));
    }

    #[test]
    fn stale_snapshot_scales_proportionally_and_clamps_pending() {
        // The payment covered a sibling submission that was deleted later,
        // so its recorded 1500 views exceed the surviving submission's 1000.
        // Proportional redistribution assigns all 1500 paid views to the
        // survivor and the pending side clamps at zero rather than going
        // negative.
        let submissions = [submission(2, Some("b@x.com"), 1000, 50)];
        let payments = [payment(1, "b@x.com", 1500, &[2, 99])];

        let summaries = reconcile(&submissions, &payments);

        let summary = &summaries[0];
        assert_eq!(summary.pending_views, Decimal::ZERO);
        assert_eq!(summary.pending_payment, Decimal::ZERO);
        // Overcoverage drifts the paid amount past the recorded potential;
        // the drift is accepted, not hidden.
        assert_eq!(summary.paid_amount, Decimal::new(75, 2));
        assert_eq!(summary.total_payment_potential, Decimal::new(50, 2));
    }

    #[test]
    fn stale_snapshot_smaller_than_current_leaves_remainder_pending() {
        // Views grew after issuance: 1000 recorded, 4000 current. The
        // recorded views are distributed proportionally (all to the single
        // covered submission) and the growth stays pending.
        let submissions = [submission(1, Some("a@x.com"), 4000, 200)];
        let payments = [payment(1, "a@x.com", 1000, &[1])];

        let summaries = reconcile(&submissions, &payments);

        let summary = &summaries[0];
        assert_eq!(summary.pending_views, Decimal::from(3000));
        assert_eq!(summary.pending_payment, Decimal::new(150, 2));
        assert_eq!(summary.paid_amount, Decimal::new(50, 2));
    }

    #[test]
    fn proportional_distribution_follows_current_view_shares() {
        // 3000 recorded views over a group currently at 1000 + 3000: the
        // proportional rule (not equal split) gives 750 and 2250 paid views.
        let submissions = [
            submission(1, Some("a@x.com"), 1000, 100),
            submission(2, Some("a@x.com"), 3000, 300),
        ];
        let payments = [payment(1, "a@x.com", 3000, &[1, 2])];

        let summaries = reconcile(&submissions, &payments);

        let summary = &summaries[0];
        // Submission 1: 1000 - 750 = 250 pending at 0.001/view = 0.25.
        // Submission 2: 3000 - 2250 = 750 pending at 0.001/view = 0.75.
        assert_eq!(summary.pending_views, Decimal::from(1000));
        assert_eq!(summary.pending_payment, Decimal::new(100, 2));
        assert_eq!(summary.paid_amount, Decimal::new(300, 2));
        assert_eq!(
            summary.pending_submission_ids,
            vec![SubmissionId(1), SubmissionId(2)]
        );
    }

    #[test]
    fn paid_views_accumulate_across_payments() {
        let submissions = [submission(1, Some("a@x.com"), 4000, 200)];
        let payments = [
            payment(1, "a@x.com", 1000, &[1]),
            payment(2, "a@x.com", 1000, &[1]),
        ];

        let summaries = reconcile(&submissions, &payments);

        let summary = &summaries[0];
        assert_eq!(summary.pending_views, Decimal::from(2000));
        assert_eq!(summary.paid_amount, Decimal::new(100, 2));
        assert_eq!(summary.pending_payment, Decimal::new(100, 2));
    }

    #[test]
    fn ownerless_submissions_are_excluded() {
        let submissions = [
            submission(1, None, 5000, 250),
            submission(2, Some("a@x.com"), 100, 5),
        ];

        let summaries = reconcile(&submissions, &[]);

        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].email, "a@x.com");
        assert_eq!(summaries[0].total_views, 100);
    }

    #[test]
    fn zero_view_submission_contributes_nothing() {
        // A recorded amount with no views behind it: the derived unit rate
        // is zero, so neither side of the ledger moves.
        let submissions = [submission(1, Some("a@x.com"), 0, 100)];

        let summaries = reconcile(&submissions, &[]);

        let summary = &summaries[0];
        assert_eq!(summary.paid_amount, Decimal::ZERO);
        assert_eq!(summary.pending_payment, Decimal::ZERO);
        assert_eq!(summary.total_payment_potential, Decimal::new(100, 2));
    }

    #[test]
    fn payment_covering_only_deleted_submissions_is_ignored() {
        let submissions = [submission(1, Some("a@x.com"), 2000, 100)];
        let payments = [payment(1, "a@x.com", 9000, &[7, 8])];

        let summaries = reconcile(&submissions, &payments);

        let summary = &summaries[0];
        assert_eq!(summary.paid_amount, Decimal::ZERO);
        assert_eq!(summary.pending_payment, Decimal::new(100, 2));
    }

    #[test]
    fn summaries_are_sorted_by_pending_payment_descending() {
        let submissions = [
            submission(1, Some("small@x.com"), 1000, 10),
            submission(2, Some("big@x.com"), 1000, 300),
            submission(3, Some("mid@x.com"), 1000, 100),
        ];

        let summaries = reconcile(&submissions, &[]);

        let order: Vec<&str> = summaries.iter().map(|s| s.email.as_str()).collect();
        assert_eq!(order, vec!["big@x.com", "mid@x.com", "small@x.com"]);
    }

    #[test]
    fn repeated_passes_yield_identical_summaries() {
        let submissions = [
            submission(1, Some("a@x.com"), 1000, 100),
            submission(2, Some("b@x.com"), 2000, 100),
            submission(3, Some("c@x.com"), 500, 100),
            submission(4, None, 700, 35),
        ];
        let payments = [
            payment(1, "a@x.com", 400, &[1]),
            payment(2, "b@x.com", 2000, &[2]),
        ];

        let first = reconcile(&submissions, &payments);
        let second = reconcile(&submissions, &payments);

        assert_eq!(first, second);
    }

    #[test]
    fn per_submission_ledgers_group_per_contributor() {
        let submissions = [
            submission(1, Some("a@x.com"), 1000, 100),
            submission(2, Some("a@x.com"), 2000, 50),
            submission(3, Some("b@x.com"), 500, 25),
        ];
        let payments = [payment(1, "a@x.com", 1000, &[1])];

        let summaries = reconcile(&submissions, &payments);

        let by_email: std::collections::HashMap<&str, _> = summaries
            .iter()
            .map(|s| (s.email.as_str(), s))
            .collect();

        let a = by_email["a@x.com"];
        assert_eq!(a.total_views, 3000);
        assert_eq!(a.total_payment_potential, Decimal::new(150, 2));
        assert_eq!(a.paid_amount, Decimal::new(100, 2));
        assert_eq!(a.pending_payment, Decimal::new(50, 2));
        assert_eq!(a.submission_ids, vec![SubmissionId(1), SubmissionId(2)]);
        assert_eq!(a.pending_submission_ids, vec![SubmissionId(2)]);

        let expected_views = map! {
            "a@x.com" => 3000u64,
            "b@x.com" => 500u64,
        };
        for (email, views) in expected_views {
            assert_eq!(by_email[email].total_views, views);
        }
    }
}
