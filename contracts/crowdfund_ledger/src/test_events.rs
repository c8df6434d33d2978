use crate::{Address, Error, Ledger, LedgerEvent, ManualClock, NativeBank, UNIT};

const START: u64 = 1_000;

fn owner() -> Address {
    Address::repeat_byte(0xa0)
}

fn donor() -> Address {
    Address::repeat_byte(0xd0)
}

fn registry() -> Address {
    Address::repeat_byte(0xc0)
}

fn setup() -> (Ledger<ManualClock>, ManualClock) {
    let clock = ManualClock::new(START);
    let mut bank = NativeBank::new();
    bank.credit(donor(), 10 * UNIT).unwrap();
    let ledger = Ledger::deploy(clock.clone(), bank, owner(), registry(), 1_000).unwrap();
    (ledger, clock)
}

#[test]
fn test_deploy_events() {
    let (mut ledger, _) = setup();
    assert_eq!(
        ledger.drain_events(),
        vec![
            LedgerEvent::Transfer {
                from: Address::ZERO,
                to: owner(),
                amount: 1_000 * UNIT,
            },
            LedgerEvent::OwnershipTransferred {
                previous: owner(),
                new: registry(),
            },
        ]
    );
    assert!(ledger.events().is_empty());
}

#[test]
fn test_campaign_created_event() {
    let (mut ledger, _) = setup();
    ledger.drain_events();

    let id = ledger
        .create_campaign(owner(), "Solar roof", 5 * UNIT, 86_400)
        .unwrap();

    assert_eq!(
        ledger.drain_events(),
        vec![LedgerEvent::CampaignCreated {
            campaign_id: id,
            title: "Solar roof".into(),
            goal: 5 * UNIT,
            deadline: START + 86_400,
            creator: owner(),
        }]
    );
}

#[test]
fn test_contribution_events_in_commit_order() {
    let (mut ledger, _) = setup();
    let id = ledger
        .create_campaign(owner(), "Solar roof", 5 * UNIT, 86_400)
        .unwrap();
    ledger.drain_events();

    ledger.contribute(donor(), id, UNIT / 2).unwrap();

    let events = ledger.drain_events();
    assert_eq!(
        events,
        vec![
            LedgerEvent::Transfer {
                from: Address::ZERO,
                to: donor(),
                amount: 50 * UNIT,
            },
            LedgerEvent::ContributionMade {
                campaign_id: id,
                contributor: donor(),
                amount: UNIT / 2,
            },
        ]
    );
    assert_eq!(events[0].campaign_id(), None);
    assert_eq!(events[1].campaign_id(), Some(id));
    assert_eq!(events[1].actor(), donor());
}

#[test]
fn test_campaign_finalized_event() {
    let (mut ledger, clock) = setup();
    let id = ledger
        .create_campaign(owner(), "Solar roof", 5 * UNIT, 60)
        .unwrap();
    ledger.contribute(donor(), id, 2 * UNIT).unwrap();
    clock.advance(60);
    ledger.drain_events();

    ledger.finalize_campaign(donor(), id).unwrap();

    assert_eq!(
        ledger.drain_events(),
        vec![LedgerEvent::CampaignFinalized {
            campaign_id: id,
            creator: owner(),
            total_raised: 2 * UNIT,
        }]
    );
}

#[test]
fn test_finalized_event_names_the_paid_creator() {
    let event = LedgerEvent::CampaignFinalized {
        campaign_id: 2,
        creator: owner(),
        total_raised: UNIT,
    };
    assert_eq!(event.actor(), owner());
    assert_eq!(event.amount(), Some(UNIT));
    assert_eq!(event.campaign_id(), Some(2));
}

#[test]
fn test_token_transfer_event() {
    let (mut ledger, _) = setup();
    ledger.drain_events();

    ledger.transfer(owner(), donor(), 50 * UNIT).unwrap();
    ledger.transfer(owner(), owner(), 10 * UNIT).unwrap();

    assert_eq!(
        ledger.drain_events(),
        vec![
            LedgerEvent::Transfer {
                from: owner(),
                to: donor(),
                amount: 50 * UNIT,
            },
            LedgerEvent::Transfer {
                from: owner(),
                to: owner(),
                amount: 10 * UNIT,
            },
        ]
    );
}

#[test]
fn test_rejected_operations_emit_nothing() {
    let (mut ledger, clock) = setup();
    let id = ledger
        .create_campaign(owner(), "Solar roof", 5 * UNIT, 60)
        .unwrap();
    ledger.drain_events();

    assert_eq!(
        ledger.create_campaign(owner(), "Nope", 0, 60),
        Err(Error::InvalidGoal)
    );
    assert!(ledger.transfer(donor(), owner(), 1).is_err());
    assert!(ledger.mint(owner(), owner(), 1).is_err());
    assert_eq!(
        ledger.finalize_campaign(owner(), id),
        Err(Error::NotFinalizable(id))
    );
    clock.advance(60);
    assert_eq!(
        ledger.contribute(donor(), id, UNIT),
        Err(Error::CampaignEnded(id))
    );

    assert!(ledger.events().is_empty());
}

#[test]
fn test_event_json_shape() {
    let event = LedgerEvent::ContributionMade {
        campaign_id: 3,
        contributor: donor(),
        amount: 42,
    };
    let json = serde_json::to_string(&event).unwrap();
    assert_eq!(
        json,
        format!(
            r#"{{"event":"contribution_made","campaign_id":3,"contributor":"{}","amount":42}}"#,
            donor()
        )
    );
    assert_eq!(event.name(), "contribution_made");
}
