use std::collections::HashMap;

use friend_ledger::{
    AccountId, DepositError, InMemoryLedger, Transaction, TransactionKind, TransferError,
    WithdrawError, config::LedgerConfig, directory::UserRegistry, events::NullEventSink,
    ledger::AccountLedger,
};
use proptest::prelude::*;
use rust_decimal::Decimal;

const OWNERS: [&str; 3] = ["alice", "bob", "carol"];

#[derive(Debug, Clone)]
enum Op {
    Deposit(usize, i64),
    Withdraw(usize, i64),
    Transfer(usize, usize, i64),
}

fn op() -> impl Strategy<Value = Op> {
    let account = 0usize..4;
    let cents = 0i64..50_000;
    prop_oneof![
        (account.clone(), cents.clone()).prop_map(|(a, c)| Op::Deposit(a, c)),
        (account.clone(), cents.clone()).prop_map(|(a, c)| Op::Withdraw(a, c)),
        (account.clone(), account, cents).prop_map(|(a, b, c)| Op::Transfer(a, b, c)),
    ]
}

/// alice and bob are friends; alice owns two accounts.
fn setup() -> (InMemoryLedger, Vec<AccountId>) {
    let users = UserRegistry::new();
    for owner in OWNERS {
        users.register(owner).unwrap();
    }
    users.add_friend("alice", "bob").unwrap();
    let ledger = AccountLedger::in_memory(users, NullEventSink, LedgerConfig::default());
    let ids = ["alice", "alice", "bob", "carol"]
        .into_iter()
        .map(|owner| ledger.create_account(owner).unwrap().id())
        .collect();
    (ledger, ids)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        ..ProptestConfig::default()
    })]

    /// Every balance equals the sum of the committed deltas affecting it, and
    /// a debit is refused exactly when the balance cannot cover it.
    #[test]
    fn balances_match_committed_deltas(ops in prop::collection::vec(op(), 1..40)) {
        let (ledger, ids) = setup();
        let mut model: HashMap<AccountId, Decimal> =
            ids.iter().map(|id| (*id, Decimal::ZERO)).collect();

        for op in ops {
            match op {
                Op::Deposit(a, cents) => {
                    let id = ids[a];
                    let amount = Decimal::new(cents, 2);
                    let tx = ledger.deposit(id, amount).unwrap();
                    *model.get_mut(&id).unwrap() += amount;
                    prop_assert_eq!(tx.kind(), TransactionKind::Deposit);
                }
                Op::Withdraw(a, cents) => {
                    let id = ids[a];
                    let amount = Decimal::new(cents, 2);
                    let available = model[&id];
                    match ledger.withdraw(id, amount) {
                        Ok(_) => {
                            prop_assert!(amount <= available);
                            *model.get_mut(&id).unwrap() -= amount;
                        }
                        Err(WithdrawError::InsufficientFunds { available: reported, requested }) => {
                            prop_assert!(amount > available);
                            prop_assert_eq!(reported, available);
                            prop_assert_eq!(requested, amount);
                        }
                        Err(err) => prop_assert!(false, "unexpected error: {}", err),
                    }
                }
                Op::Transfer(a, b, cents) => {
                    let (from, to) = (ids[a], ids[b]);
                    let amount = Decimal::new(cents, 2);
                    match ledger.transfer(from, to, amount) {
                        Ok(Transaction::Transfer { commission, sender_account_id, receiver_account_id, .. }) => {
                            prop_assert_eq!(sender_account_id, from);
                            prop_assert_eq!(receiver_account_id, to);
                            *model.get_mut(&from).unwrap() -= amount + commission;
                            *model.get_mut(&to).unwrap() += amount;
                        }
                        Ok(other) => prop_assert!(false, "unexpected record: {:?}", other),
                        Err(TransferError::InsufficientFunds { requested, .. }) => {
                            prop_assert_eq!(requested, amount);
                        }
                        Err(err) => prop_assert!(false, "unexpected error: {}", err),
                    }
                }
            }
        }

        for account in ledger.accounts() {
            prop_assert!(account.balance() >= Decimal::ZERO);
            prop_assert_eq!(account.balance(), model[&account.id()]);
        }
    }

    #[test]
    fn commission_follows_relationship(cents in 1i64..1_000_000) {
        let (ledger, ids) = setup();
        let amount = Decimal::new(cents, 2);
        ledger.deposit(ids[0], amount * Decimal::TWO).unwrap();

        // alice -> alice, alice -> bob (friend), alice -> carol (stranger)
        let expected = [
            (ids[1], Decimal::ZERO),
            (ids[2], amount * Decimal::new(3, 2)),
            (ids[3], amount * Decimal::new(10, 2)),
        ];
        for (to, commission) in expected {
            let tx = ledger.transfer(ids[0], to, Decimal::new(cents, 3)).unwrap();
            prop_assert_eq!(tx.commission() * Decimal::TEN, commission);
        }
    }

    #[test]
    fn records_read_back_unchanged(cents in 0i64..100_000) {
        let (ledger, ids) = setup();
        let deposit = ledger.deposit(ids[2], Decimal::new(cents, 2)).unwrap();
        let transfer = ledger.transfer(ids[2], ids[0], Decimal::ZERO).unwrap();

        prop_assert_eq!(ledger.transactions_of(ids[2], TransactionKind::Deposit), vec![deposit]);
        prop_assert_eq!(ledger.transactions_of(ids[0], TransactionKind::Transfer), vec![transfer]);
    }

    #[test]
    fn negative_amounts_change_nothing(cents in 1i64..100_000) {
        let (ledger, ids) = setup();
        let amount = Decimal::new(-cents, 2);
        prop_assert_eq!(ledger.deposit(ids[0], amount).unwrap_err(), DepositError::NegativeAmount);
        prop_assert_eq!(ledger.withdraw(ids[0], amount).unwrap_err(), WithdrawError::NegativeAmount);
        prop_assert_eq!(ledger.transfer(ids[0], ids[1], amount).unwrap_err(), TransferError::NegativeAmount);
        prop_assert!(ledger.transactions().is_empty());
    }
}
