#![allow(dead_code)]

use crate::clock::Clock;
use crate::types::{Amount, Campaign, CampaignStatus};
use crate::Ledger;

/// INV-1: token supply equals the sum of all balances.
pub fn assert_supply_conserved<C: Clock>(ledger: &Ledger<C>) {
    let sum = ledger
        .token()
        .holders()
        .try_fold(0u128, |acc, (_, v)| acc.checked_add(v))
        .expect("INV-1 violated: balance sum overflows");
    assert_eq!(
        sum,
        ledger.total_supply(),
        "INV-1 violated: balances sum to {} but supply is {}",
        sum,
        ledger.total_supply()
    );
}

/// INV-2: a campaign's total equals the sum of its contribution records.
pub fn assert_contributions_add_up<C: Clock>(ledger: &Ledger<C>, campaign: &Campaign) {
    let sum: Amount = ledger
        .registry()
        .contributors(campaign.id)
        .map(|(_, amount)| amount)
        .sum();
    assert_eq!(
        sum, campaign.total_raised,
        "INV-2 violated: campaign {} records {} but raised {}",
        campaign.id, sum, campaign.total_raised
    );
}

/// INV-3: positive id and goal, non-empty title.
pub fn assert_campaign_well_formed(campaign: &Campaign) {
    assert!(campaign.id > 0, "INV-3 violated: campaign id 0");
    assert!(
        campaign.goal > 0,
        "INV-3 violated: campaign {} has zero goal",
        campaign.id
    );
    assert!(
        !campaign.title.trim().is_empty(),
        "INV-3 violated: campaign {} has empty title",
        campaign.id
    );
}

/// INV-4: ids run 1..=campaign_count without gaps.
pub fn assert_sequential_ids<C: Clock>(ledger: &Ledger<C>) {
    let ids: Vec<u64> = ledger.campaigns().map(|c| c.id).collect();
    let expected: Vec<u64> = (1..=ledger.campaign_count()).collect();
    assert_eq!(ids, expected, "INV-4 violated: ids are not sequential");
}

/// INV-5: the registry escrow covers everything raised and not yet paid out.
pub fn assert_escrow_covers_open_campaigns<C: Clock>(ledger: &Ledger<C>) {
    let owed: Amount = ledger
        .campaigns()
        .filter(|c| !c.finalized)
        .map(|c| c.total_raised)
        .sum();
    let escrow = ledger.native_balance_of(&ledger.registry().address());
    assert_eq!(
        escrow, owed,
        "INV-5 violated: escrow holds {} but unfinalized campaigns raised {}",
        escrow, owed
    );
}

/// INV-6: only forward status transitions.
pub fn assert_valid_status_transition(from: CampaignStatus, to: CampaignStatus) {
    let valid = from == to
        || matches!(
            (from, to),
            (CampaignStatus::Open, CampaignStatus::Finalizable)
                | (CampaignStatus::Open, CampaignStatus::Finalized)
                | (CampaignStatus::Finalizable, CampaignStatus::Finalized)
        );
    assert!(
        valid,
        "INV-6 violated: invalid status transition from {:?} to {:?}",
        from, to
    );
}

/// INV-7: fields fixed at creation never change.
pub fn assert_campaign_immutable_fields(original: &Campaign, current: &Campaign) {
    assert_eq!(original.id, current.id, "INV-7 violated: campaign id changed");
    assert_eq!(
        original.title, current.title,
        "INV-7 violated: campaign title changed"
    );
    assert_eq!(
        original.goal, current.goal,
        "INV-7 violated: campaign goal changed"
    );
    assert_eq!(
        original.deadline, current.deadline,
        "INV-7 violated: campaign deadline changed"
    );
    assert_eq!(
        original.creator, current.creator,
        "INV-7 violated: campaign creator changed"
    );
}

/// Run every ledger-wide invariant.
pub fn assert_all_invariants<C: Clock>(ledger: &Ledger<C>) {
    assert_supply_conserved(ledger);
    assert_sequential_ids(ledger);
    assert_escrow_covers_open_campaigns(ledger);
    for campaign in ledger.campaigns() {
        assert_campaign_well_formed(&campaign);
        assert_contributions_add_up(ledger, &campaign);
    }
}
