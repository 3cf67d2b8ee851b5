use common::decimal::token;
use common::error::Error;
use common::model::{Address, Ticker};
use ledger_service::Ledger;

fn vrt(amount: &str) -> u128 {
    token::parse(amount).unwrap()
}

#[test]
fn test_genesis_supply() {
    let owner = Address::random();
    let ledger = Ledger::with_genesis(owner, vrt("1000")).unwrap();

    assert_eq!(ledger.balances().total_supply(), vrt("1000"));
    assert_eq!(ledger.balances().balance_of(&owner), vrt("1000"));
    assert_eq!(ledger.balances().balance_of(&Address::random()), 0);
    assert_eq!(ledger.events().len(), 1);
}

#[test]
fn test_transfer() {
    let owner = Address::random();
    let alice = Address::random();
    let mut ledger = Ledger::with_genesis(owner, vrt("1000")).unwrap();

    let mut tx = ledger.begin();
    tx.transfer(&owner, &alice, vrt("6.018")).unwrap();
    tx.commit();

    assert_eq!(ledger.balances().balance_of(&owner), vrt("993.982"));
    assert_eq!(ledger.balances().balance_of(&alice), vrt("6.018"));
    assert_eq!(ledger.balances().total_supply(), vrt("1000"));
}

#[test]
fn test_transfer_exceeding_balance_fails() {
    let owner = Address::random();
    let alice = Address::random();
    let mut ledger = Ledger::with_genesis(owner, vrt("10")).unwrap();

    let mut tx = ledger.begin();
    let result = tx.transfer(&alice, &owner, 1);
    assert!(matches!(result, Err(Error::InsufficientBalance(_))));
    drop(tx);

    assert_eq!(ledger.balances().balance_of(&owner), vrt("10"));
}

#[test]
fn test_self_transfer_keeps_balance() {
    let owner = Address::random();
    let mut ledger = Ledger::with_genesis(owner, vrt("10")).unwrap();

    let mut tx = ledger.begin();
    tx.transfer(&owner, &owner, vrt("4")).unwrap();
    tx.commit();

    assert_eq!(ledger.balances().balance_of(&owner), vrt("10"));
}

#[test]
fn test_burn_reduces_supply() {
    let owner = Address::random();
    let mut ledger = Ledger::with_genesis(owner, vrt("10")).unwrap();

    let mut tx = ledger.begin();
    tx.burn(&owner, vrt("6")).unwrap();
    let result = tx.burn(&owner, vrt("5"));
    assert!(matches!(result, Err(Error::InsufficientBalance(_))));
    tx.commit();

    assert_eq!(ledger.balances().balance_of(&owner), vrt("4"));
    assert_eq!(ledger.balances().total_supply(), vrt("4"));
}

#[test]
fn test_allowance_flow() {
    let owner = Address::random();
    let spender = Address::random();
    let recipient = Address::random();
    let mut ledger = Ledger::with_genesis(owner, vrt("100")).unwrap();

    let mut tx = ledger.begin();
    tx.approve(&owner, &spender, vrt("30"));
    tx.transfer_from(&spender, &owner, &recipient, vrt("20")).unwrap();
    tx.commit();

    assert_eq!(ledger.balances().allowance(&owner, &spender), vrt("10"));
    assert_eq!(ledger.balances().balance_of(&recipient), vrt("20"));

    let mut tx = ledger.begin();
    let result = tx.transfer_from(&spender, &owner, &recipient, vrt("11"));
    assert!(matches!(result, Err(Error::InsufficientAllowance(_))));
}

#[test]
fn test_positions() {
    let alice = Address::random();
    let btc = Ticker::new("BTC").unwrap();
    let mut ledger = Ledger::new();

    let mut tx = ledger.begin();
    tx.increase_position(&alice, &btc, vrt("0.5")).unwrap();
    tx.decrease_position(&alice, &btc, vrt("0.2")).unwrap();
    let result = tx.decrease_position(&alice, &btc, vrt("0.4"));
    assert!(matches!(result, Err(Error::InsufficientPosition(_))));
    tx.commit();

    assert_eq!(ledger.positions().position_of(&alice, &btc), vrt("0.3"));
    assert_eq!(ledger.positions().open_interest(&btc), vrt("0.3"));
    assert_eq!(ledger.positions().position_of(&Address::random(), &btc), 0);
}

#[test]
fn test_zeroed_positions_are_kept() {
    let alice = Address::random();
    let eth = Ticker::new("ETH").unwrap();
    let mut ledger = Ledger::new();

    let mut tx = ledger.begin();
    tx.increase_position(&alice, &eth, vrt("2")).unwrap();
    tx.decrease_position(&alice, &eth, vrt("2")).unwrap();
    tx.commit();

    let positions = ledger.positions().positions_of(&alice);
    assert_eq!(positions.get(&eth), Some(&0));
}
