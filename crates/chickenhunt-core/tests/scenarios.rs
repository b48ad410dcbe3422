//! End-to-end game scenarios played through the public engine API.
//!
//! Every scenario runs on a [`ManualClock`] and, where combat is involved,
//! fixed [`ConstantEntropy`] weights, so outcomes are exact.

#![allow(clippy::unwrap_used, clippy::arithmetic_side_effects, clippy::panic)]

use chickenhunt_core::{
    ChickenHunt, CombatOutcome, ConstantEntropy, GameConfig, GameError, ManualClock,
    SeededEntropy,
};
use chickenhunt_ledger::SolvencyResult;
use chickenhunt_types::{Attribute, DepotTier, GameEvent, PlayerId};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

const GENESIS: u64 = 1_700_000_000;
const DAY: u64 = 86_400;
const DEPOT_PRICE: u128 = 50_000_000_000_000_000;
const ITEM_COST: u128 = 10_000_000_000_000_000;

type Game = ChickenHunt<ManualClock, ConstantEntropy>;

fn start(entropy: ConstantEntropy) -> (Game, PlayerId) {
    let admin = PlayerId::new();
    let game = ChickenHunt::new(
        GameConfig::launch(),
        admin,
        ManualClock::new(GENESIS),
        entropy,
    )
    .unwrap();
    (game, admin)
}

fn join(game: &mut Game) -> PlayerId {
    let player = PlayerId::new();
    game.join(player).unwrap();
    player
}

fn events_of(game: &mut Game) -> Vec<GameEvent> {
    game.drain_events().into_iter().map(|r| r.event).collect()
}

fn assert_solvent<E: chickenhunt_core::Entropy>(game: &ChickenHunt<ManualClock, E>) {
    match game.audit_solvency().unwrap() {
        SolvencyResult::Solvent { .. } => {}
        SolvencyResult::Anomaly(anomaly) => panic!("insolvent: {anomaly}"),
    }
}

// ---------------------------------------------------------------------------
// Altar
// ---------------------------------------------------------------------------

#[test]
fn sole_depositor_collects_a_tenth_of_the_fund() {
    let (mut game, admin) = start(ConstantEntropy::even());
    let payer = join(&mut game);
    let alice = join(&mut game);

    // 75% of 1334 wei is exactly 1000 wei for the altar.
    game.set_depot(
        admin,
        DepotTier {
            price: 1_334,
            max: 9,
        },
    )
    .unwrap();
    game.buy_depots(payer, 1, 1_334).unwrap();
    assert_eq!(game.altar_fund(), 1_000);

    game.clock_mut().advance(200).unwrap();
    assert_eq!(game.chicken_of(alice).unwrap(), 200);
    game.chicken_to_altar(alice, 200).unwrap();

    let record = game.altar_record(0).unwrap();
    assert_eq!(record.currency_allocated, 100);
    assert_eq!(record.total_resource_deposited, 200);
    assert_eq!(game.altar_fund(), 900);
    assert_eq!(game.chicken_of(alice).unwrap(), 0);

    assert!(matches!(
        game.ethereum_from_altar(alice),
        Err(GameError::NotMatured { record: 0, today: 0 })
    ));

    game.clock_mut().advance(DAY).unwrap();
    assert_eq!(game.ethereum_from_altar(alice).unwrap(), 100);
    assert_eq!(game.wallet_balance(alice), 100);
    assert_eq!(game.trade_book(alice), None);
    assert_eq!(game.ethereum_from_altar(alice).unwrap(), 0);
    assert_eq!(game.withdraw(alice).unwrap(), 100);
    assert_solvent(&game);
}

#[test]
fn later_deposit_settles_first_and_orders_events() {
    let (mut game, _) = start(ConstantEntropy::even());
    let payer = join(&mut game);
    let alice = join(&mut game);
    game.buy_depots(payer, 1, DEPOT_PRICE).unwrap();

    game.clock_mut().advance(50).unwrap();
    game.chicken_to_altar(alice, 50).unwrap();
    game.clock_mut().advance(2 * DAY).unwrap();
    game.drain_events();

    game.chicken_to_altar(alice, 10).unwrap();
    let events: Vec<GameEvent> = game.drain_events().into_iter().map(|r| r.event).collect();
    assert_eq!(events.len(), 3);
    assert!(matches!(events.first(), Some(GameEvent::NewAltarRecord { id: 2, .. })));
    // Sole depositor of day 0 gets the whole tenth of the fund.
    let income = DEPOT_PRICE * 3 / 4 / 10;
    assert_eq!(
        events.get(1),
        Some(&GameEvent::AltarSettlement {
            player: alice,
            id: 0,
            value: income,
        })
    );
    assert!(matches!(
        events.get(2),
        Some(GameEvent::AltarDeposit { id: 2, value: 10, .. })
    ));
    assert_eq!(game.wallet_balance(alice), income);
    assert_solvent(&game);
}

#[test]
fn altar_buckets_pay_pro_rata_across_days() {
    let (mut game, admin) = start(ConstantEntropy::even());
    let payer = join(&mut game);
    let users = [join(&mut game), join(&mut game), join(&mut game)];
    let [alice, bob, carol] = users;

    // 75% of 1334 wei puts exactly 1000 wei in the altar.
    game.set_depot(admin, DepotTier { price: 1_334, max: 9 }).unwrap();
    game.buy_depots(payer, 1, 1_334).unwrap();
    game.clock_mut().advance(200).unwrap();

    // Day 0: a lone deposit takes the whole 100 wei bucket.
    game.chicken_to_altar(alice, 200).unwrap();
    game.clock_mut().advance(DAY).unwrap();
    assert_eq!(game.ethereum_from_altar(alice).unwrap(), 100);
    assert_eq!(game.altar_fund(), 900);

    // Day 8: top the fund back up to 1000 (75% of 134 floors to 100).
    game.clock_mut().advance(7 * DAY).unwrap();
    game.set_depot(admin, DepotTier { price: 134, max: 9 }).unwrap();
    game.buy_depots(payer, 1, 134).unwrap();
    assert_eq!(game.altar_fund(), 1_000);
    game.drain_events();

    game.chicken_to_altar(alice, 300).unwrap();
    assert_eq!(
        events_of(&mut game),
        vec![
            GameEvent::NewAltarRecord {
                id: 8,
                currency_allocated: 100,
            },
            GameEvent::AltarDeposit {
                player: alice,
                id: 8,
                value: 300,
            },
        ]
    );
    game.chicken_to_altar(bob, 100).unwrap();
    assert_eq!(
        events_of(&mut game),
        vec![GameEvent::AltarDeposit {
            player: bob,
            id: 8,
            value: 100,
        }]
    );

    // Day 11: new deposits auto-settle the day 8 positions.
    game.clock_mut().advance(3 * DAY).unwrap();
    game.chicken_to_altar(alice, 200).unwrap();
    assert_eq!(
        events_of(&mut game),
        vec![
            GameEvent::NewAltarRecord {
                id: 11,
                currency_allocated: 90,
            },
            GameEvent::AltarSettlement {
                player: alice,
                id: 8,
                value: 75,
            },
            GameEvent::AltarDeposit {
                player: alice,
                id: 11,
                value: 200,
            },
        ]
    );
    game.chicken_to_altar(carol, 1_000).unwrap();
    assert_eq!(events_of(&mut game).len(), 1);
    game.chicken_to_altar(bob, 800).unwrap();
    assert_eq!(
        events_of(&mut game),
        vec![
            GameEvent::AltarSettlement {
                player: bob,
                id: 8,
                value: 25,
            },
            GameEvent::AltarDeposit {
                player: bob,
                id: 11,
                value: 800,
            },
        ]
    );

    // Day 12: the 90 wei bucket splits 200:800:1000.
    game.clock_mut().advance(DAY).unwrap();
    for player in &users {
        game.ethereum_from_altar(*player).unwrap();
        assert_eq!(game.trade_book(*player), None);
    }
    let wallets: Vec<u128> = users.iter().map(|p| game.wallet_balance(*p)).collect();
    assert_eq!(wallets, vec![100 + 75 + 9, 25 + 36, 45]);
    assert_eq!(game.altar_fund(), 810);
    assert_eq!(game.solvency_snapshot().unwrap().altar_reserved, 0);
    assert_solvent(&game);
}

#[test]
fn altar_income_never_exceeds_allocation() {
    let (mut game, _) = start(ConstantEntropy::even());
    let payer = join(&mut game);
    let depositors: Vec<PlayerId> = (0..3).map(|_| join(&mut game)).collect();
    game.buy_depots(payer, 1, DEPOT_PRICE).unwrap();

    game.clock_mut().advance(1_000).unwrap();
    for (n, player) in depositors.iter().enumerate() {
        game.chicken_to_altar(*player, 100 + u128::try_from(n).unwrap() * 77)
            .unwrap();
    }
    let allocated = game.altar_record(0).unwrap().currency_allocated;

    game.clock_mut().advance(DAY).unwrap();
    let paid: u128 = depositors
        .iter()
        .map(|player| game.ethereum_from_altar(*player).unwrap())
        .sum();
    assert!(paid <= allocated);
    assert!(allocated - paid < 3);
    assert_solvent(&game);
}

// ---------------------------------------------------------------------------
// Arena
// ---------------------------------------------------------------------------

#[test]
fn equal_scores_let_the_attacker_plunder() {
    // 10 * 10 * 11 == 110 * 10 * 1
    let (mut game, _) = start(ConstantEntropy {
        attack: 11,
        defense: 1,
    });
    let attacker = join(&mut game);
    let defender = join(&mut game);
    game.clock_mut().advance(1_000).unwrap();

    let outcome = game.attack(attacker, defender).unwrap();
    assert!(matches!(outcome, CombatOutcome::Victory { booty: 1_000, .. }));
    assert_eq!(game.chicken_of(attacker).unwrap(), 2_000);
    assert_eq!(game.chicken_of(defender).unwrap(), 0);

    assert!(matches!(
        game.attack(attacker, defender),
        Err(GameError::Cooldown { .. })
    ));
    game.clock_mut().advance(600).unwrap();
    assert!(game.attack(attacker, defender).is_ok());
}

#[test]
fn weaker_attack_changes_nothing() {
    let (mut game, _) = start(ConstantEntropy {
        attack: 10,
        defense: 1,
    });
    let attacker = join(&mut game);
    let defender = join(&mut game);
    game.clock_mut().advance(1_000).unwrap();
    game.drain_events();

    let outcome = game.attack(attacker, defender).unwrap();
    assert!(matches!(outcome, CombatOutcome::Repelled { .. }));
    assert!(game.events().is_empty());
    assert_eq!(game.chicken_of(defender).unwrap(), 1_000);
    assert_eq!(game.details_of(attacker).unwrap().player.cooldown_until, 0);
}

#[test]
fn depots_shelter_chicken() {
    let (mut game, _) = start(ConstantEntropy {
        attack: 100,
        defense: 1,
    });
    let attacker = join(&mut game);
    let defender = join(&mut game);
    game.buy_depots(defender, 3, 3 * DEPOT_PRICE).unwrap();
    game.clock_mut().advance(1_000).unwrap();

    let outcome = game.attack(attacker, defender).unwrap();
    assert!(matches!(outcome, CombatOutcome::Victory { booty: 250, .. }));
    assert_eq!(game.chicken_of(defender).unwrap(), 750);
}

// ---------------------------------------------------------------------------
// Progression caps
// ---------------------------------------------------------------------------

#[test]
fn levels_never_pass_their_max() {
    let (mut game, _) = start(ConstantEntropy::even());
    let player = join(&mut game);

    game.buy_depots(player, 8, 8 * DEPOT_PRICE).unwrap();
    assert!(matches!(
        game.buy_depots(player, 1, DEPOT_PRICE),
        Err(GameError::InvalidRange { .. })
    ));
    assert_eq!(game.details_of(player).unwrap().player.depots, 9);

    assert!(matches!(
        game.upgrade_attribute(player, Attribute::Resistance, 11, u128::MAX),
        Err(GameError::InvalidRange { .. })
    ));
    assert!(matches!(
        game.buy_pets(player, 1, 10, u128::MAX),
        Err(GameError::InvalidRange { .. })
    ));
    assert!(matches!(
        game.upgrade_attribute(player, Attribute::Strength, 1, 0),
        Err(GameError::InvalidRange { .. })
    ));
}

// ---------------------------------------------------------------------------
// Stock and dividends
// ---------------------------------------------------------------------------

#[test]
fn dividends_follow_share_history() {
    let (mut game, _) = start(ConstantEntropy::even());
    let a = join(&mut game);
    let b = join(&mut game);
    let c = join(&mut game);
    let cut = DEPOT_PRICE / 5;

    game.buy_depots(a, 1, DEPOT_PRICE).unwrap();
    assert_eq!(game.dividends_of(a).unwrap(), cut);

    game.buy_depots(b, 1, DEPOT_PRICE).unwrap();
    assert_eq!(game.dividends_of(a).unwrap(), cut + cut / 2);
    assert_eq!(game.dividends_of(b).unwrap(), cut / 2);

    let redeemed = game.redeem_shares(a).unwrap();
    assert_eq!(redeemed.shares, cut);
    assert_eq!(redeemed.dividends, cut + cut / 2);
    assert_eq!(game.wallet_balance(a), cut + cut / 2);
    assert_eq!(game.shares_of(a), 0);

    game.buy_depots(c, 1, DEPOT_PRICE).unwrap();
    assert_eq!(game.dividends_of(b).unwrap(), cut);
    assert_eq!(game.dividends_of(c).unwrap(), cut / 2);
    assert_solvent(&game);
}

#[test]
fn shares_move_without_their_past_dividends() {
    let (mut game, _) = start(ConstantEntropy::even());
    let a = join(&mut game);
    let b = join(&mut game);
    let spender = join(&mut game);
    let cut = DEPOT_PRICE / 5;
    game.buy_depots(a, 1, DEPOT_PRICE).unwrap();

    game.transfer_shares(a, b, cut / 2).unwrap();
    assert_eq!(game.dividends_of(a).unwrap(), cut);
    assert_eq!(game.dividends_of(b).unwrap(), 0);

    game.approve_shares(b, spender, cut / 4);
    assert!(game.transfer_shares_from(spender, b, spender, cut / 2).is_err());
    game.transfer_shares_from(spender, b, spender, cut / 4).unwrap();
    assert_eq!(game.allowance(b, spender), 0);
    assert_eq!(game.shares_of(spender), cut / 4);
    assert_solvent(&game);
}

// ---------------------------------------------------------------------------
// Accrual
// ---------------------------------------------------------------------------

#[test]
fn production_is_linear_between_changes() {
    let (mut game, _) = start(ConstantEntropy::even());
    let player = join(&mut game);

    game.clock_mut().advance(300).unwrap();
    let first = game.chicken_of(player).unwrap();
    game.clock_mut().advance(300).unwrap();
    let second = game.chicken_of(player).unwrap();
    assert_eq!(first, 300);
    assert_eq!(second, 2 * first);

    game.save_chicken_of(player).unwrap();
    assert_eq!(game.chicken_of(player).unwrap(), second);
    assert_eq!(game.total_chicken(), second);
}

// ---------------------------------------------------------------------------
// Purchases
// ---------------------------------------------------------------------------

#[test]
fn item_resale_chain_pays_each_seller() {
    let (mut game, admin) = start(ConstantEntropy::even());
    let b = join(&mut game);
    let c = join(&mut game);

    game.buy_item(b, 0, 12_000_000_000_000_000).unwrap();
    assert!(matches!(
        game.buy_item(c, 0, 12_000_000_000_000_000),
        Err(GameError::InsufficientPayment { .. })
    ));
    game.buy_item(c, 0, 15_000_000_000_000_000).unwrap();

    assert_eq!(game.wallet_balance(admin), 11_000_000_000_000_000);
    assert_eq!(game.wallet_balance(b), 13_200_000_000_000_000);
    assert_eq!(game.wallet_balance(c), 600_000_000_000_000);
    assert_eq!(game.dev_fee(), 2_200_000_000_000_000);
    assert_eq!(game.item(0).unwrap().owner, c);

    let hunting = |game: &Game, p| game.details_of(p).unwrap().player.hunting.multiplier;
    assert_eq!(hunting(&game, admin), 10);
    assert_eq!(hunting(&game, b), 10);
    assert_eq!(hunting(&game, c), 15);
    assert_eq!(game.withdraw_dev_fee().unwrap(), 2_200_000_000_000_000);
    assert_solvent(&game);
}

#[test]
fn store_owner_collects_the_store_cut() {
    let (mut game, admin) = start(ConstantEntropy::even());
    let buyer = join(&mut game);
    game.buy_depots(buyer, 2, 2 * DEPOT_PRICE).unwrap();
    assert_eq!(game.store().balance, 2 * DEPOT_PRICE / 100);

    assert_eq!(game.withdraw_store_balance().unwrap(), 2 * DEPOT_PRICE / 100);
    assert_eq!(game.wallet_balance(admin), 2 * DEPOT_PRICE / 100);
    assert_eq!(game.withdraw_store_balance().unwrap(), 0);
    assert_solvent(&game);
}

#[test]
fn failed_upgrade_is_atomic() {
    let (mut game, _) = start(ConstantEntropy::even());
    let player = join(&mut game);
    game.clock_mut().advance(10).unwrap();
    game.drain_events();
    let before = game.details_of(player).unwrap();
    let received = game.total_received();

    let err = game
        .upgrade_attribute(player, Attribute::Strength, 2, u128::from(u64::MAX))
        .unwrap_err();
    assert!(matches!(err, GameError::InsufficientResource { .. }));
    assert_eq!(game.details_of(player).unwrap(), before);
    assert_eq!(game.total_received(), received);
    assert_eq!(game.altar_fund(), 0);
    assert!(game.events().is_empty());
}

// ---------------------------------------------------------------------------
// Solvency under random play
// ---------------------------------------------------------------------------

#[test]
fn random_play_stays_solvent() {
    let admin = PlayerId::new();
    let mut game = ChickenHunt::new(
        GameConfig::launch(),
        admin,
        ManualClock::new(GENESIS),
        SeededEntropy::new(7),
    )
    .unwrap();
    let mut rng = SmallRng::seed_from_u64(0x00c0_ffee);
    let mut players = vec![admin];
    for _ in 0..5 {
        let player = PlayerId::new();
        game.join(player).unwrap();
        players.push(player);
    }
    let pick = |rng: &mut SmallRng, players: &[PlayerId]| {
        *players.get(rng.random_range(0..players.len())).unwrap()
    };

    for _ in 0..400 {
        let p = pick(&mut rng, &players);
        let q = pick(&mut rng, &players);
        let overpay = rng.random_range(0..1_000_u128);
        let attribute = *Attribute::ALL.get(rng.random_range(0..4)).unwrap();
        let level = game
            .details_of(p)
            .unwrap()
            .player
            .attributes
            .level(attribute);
        // Rejected moves are part of the game; only the audit matters.
        let _ = match rng.random_range(0..12) {
            0 => game.buy_depots(p, 1, DEPOT_PRICE + overpay),
            1 => game.upgrade_attribute(p, attribute, level + 1, 10_u128.pow(17) + overpay),
            2 => game.buy_pets(p, rng.random_range(0..3), 1, 10_u128.pow(17) + overpay),
            3 => game.buy_item(p, rng.random_range(0..2), 10_u128.pow(18)),
            4 => game.buy_store(p, 10_u128.pow(18)),
            5 => game.chicken_to_altar(p, rng.random_range(1..500)),
            6 => game.ethereum_from_altar(p).map(drop),
            7 => game.redeem_shares(p).map(drop),
            8 => game.transfer_shares(p, q, rng.random_range(0..ITEM_COST)),
            9 => game.withdraw(p).map(drop),
            10 => game.attack(p, q).map(drop),
            _ => game
                .withdraw_store_balance()
                .and_then(|_| game.withdraw_dev_fee())
                .map(drop),
        };
        game.clock_mut()
            .advance(rng.random_range(0..DAY / 4))
            .unwrap();
        assert_solvent(&game);
    }
    assert!(game.total_received() > 0);
}
