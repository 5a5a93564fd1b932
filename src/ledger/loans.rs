// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Flat-interest loans repaid through a precomputed installment schedule.

use rusqlite::{Connection, OptionalExtension, Row, params};
use rust_decimal::Decimal;

use crate::error::{LedgerError, Result};
use crate::ledger::categories::{AutoCategory, get_or_create_auto};
use crate::ledger::transactions::post;
use crate::models::{
    CategoryType, Frequency, InstallmentStatus, Loan, LoanInstallment, LoanStatus, NewInstallment,
    NewLoan,
};
use crate::utils::{add_periods, now_millis, round_money};

const LOAN_COLUMNS: &str = "id, title, principal_amount, interest_rate, total_repayable, start_date,
    installment_frequency, installment_amount, status, description, remaining_amount";

const INSTALLMENT_COLUMNS: &str = "id, loan_id, due_date, amount, status, paid_date";

pub(crate) fn map_loan(r: &Row) -> rusqlite::Result<Loan> {
    let rate: String = r.get(3)?;
    let interest_rate = rate.parse::<Decimal>().map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            rusqlite::types::Type::Text,
            Box::new(LedgerError::InvalidValue {
                field: "interest rate",
                value: rate.clone(),
            }),
        )
    })?;
    Ok(Loan {
        id: r.get(0)?,
        title: r.get(1)?,
        principal_amount: r.get(2)?,
        interest_rate,
        total_repayable: r.get(4)?,
        start_date: r.get(5)?,
        installment_frequency: r.get(6)?,
        installment_amount: r.get(7)?,
        status: r.get(8)?,
        description: r.get(9)?,
        remaining_amount: r.get(10)?,
    })
}

pub(crate) fn map_installment(r: &Row) -> rusqlite::Result<LoanInstallment> {
    Ok(LoanInstallment {
        id: r.get(0)?,
        loan_id: r.get(1)?,
        due_date: r.get(2)?,
        amount: r.get(3)?,
        status: r.get(4)?,
        paid_date: r.get(5)?,
    })
}

/// Build a loan and its installment schedule.
///
/// Interest is flat: `round(principal * rate / 100)`. The stored
/// `installment_amount` is `round(total / count)`, but the schedule itself
/// splits the total by whole units: every installment is `total / count`
/// and the first `total % count` of them carry one extra unit, so the
/// schedule sums exactly to the total repayable and never goes negative.
/// Installment `i` falls `i + 1` periods after `start_date`.
pub fn plan_loan(
    title: &str,
    principal: Decimal,
    interest_rate: Decimal,
    frequency: Frequency,
    count: u32,
    start_date: i64,
    description: Option<&str>,
) -> Result<(NewLoan, Vec<NewInstallment>)> {
    if count == 0 {
        return Err(LedgerError::InvalidValue {
            field: "installment count",
            value: count.to_string(),
        });
    }
    if frequency == Frequency::Yearly {
        return Err(LedgerError::InvalidValue {
            field: "installment frequency",
            value: frequency.to_string(),
        });
    }
    let principal = round_money(principal);
    if principal < 0 {
        return Err(LedgerError::NegativeAmount(principal));
    }
    if interest_rate < Decimal::ZERO {
        return Err(LedgerError::InvalidValue {
            field: "interest rate",
            value: interest_rate.to_string(),
        });
    }
    let total_interest = round_money(Decimal::from(principal) * interest_rate / Decimal::from(100));
    let total_repayable = principal + total_interest;
    let installment_amount = round_money(Decimal::from(total_repayable) / Decimal::from(count));

    let n = i64::from(count);
    let (base, extra) = (total_repayable / n, total_repayable % n);
    let installments = (0..count)
        .map(|i| NewInstallment {
            due_date: add_periods(start_date, frequency, i + 1),
            amount: base + i64::from(i64::from(i) < extra),
        })
        .collect();

    let loan = NewLoan {
        title: title.to_string(),
        principal_amount: principal,
        interest_rate,
        total_repayable,
        start_date,
        installment_frequency: frequency,
        installment_amount,
        description: description.map(str::to_string),
        remaining_amount: total_repayable,
    };
    Ok((loan, installments))
}

/// Store a loan with its pending installments. With a target account the
/// principal is disbursed into it as income.
pub fn add_loan(
    conn: &mut Connection,
    loan: &NewLoan,
    installments: &[NewInstallment],
    target_account_id: Option<i64>,
) -> Result<i64> {
    let tx = conn.transaction()?;
    tx.execute(
        "INSERT INTO loans(title, principal_amount, interest_rate, total_repayable, start_date,
            installment_frequency, installment_amount, status, description, remaining_amount)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            loan.title,
            loan.principal_amount,
            loan.interest_rate.to_string(),
            loan.total_repayable,
            loan.start_date,
            loan.installment_frequency,
            loan.installment_amount,
            LoanStatus::Active,
            loan.description,
            loan.remaining_amount
        ],
    )?;
    let loan_id = tx.last_insert_rowid();

    {
        let mut stmt = tx.prepare(
            "INSERT INTO loan_installments(loan_id, due_date, amount, status) VALUES (?1, ?2, ?3, ?4)",
        )?;
        for inst in installments {
            stmt.execute(params![
                loan_id,
                inst.due_date,
                inst.amount,
                InstallmentStatus::Pending
            ])?;
        }
    }

    if let Some(account_id) = target_account_id {
        let category_id = get_or_create_auto(&tx, AutoCategory::Loan, CategoryType::Income)?;
        post(
            &tx,
            loan.principal_amount,
            loan.start_date,
            category_id,
            CategoryType::Income,
            &format!("Loan Disbursement: {}", loan.title),
            Some(account_id),
        )?;
    }
    tx.commit()?;
    tracing::info!(
        loan_id,
        principal = loan.principal_amount,
        installments = installments.len(),
        ?target_account_id,
        "loan added"
    );
    Ok(loan_id)
}

/// Pay one installment. Already-paid or missing installments are a no-op.
///
/// The loan's remaining amount drops by the installment amount. The loan
/// completes once that reaches zero and no installment is left pending,
/// whether or not an account was charged.
pub fn pay_installment(
    conn: &mut Connection,
    installment_id: i64,
    account_id: Option<i64>,
) -> Result<()> {
    let tx = conn.transaction()?;
    let Some(inst) = get_installment(&tx, installment_id)? else {
        tracing::warn!(installment_id, "payment of missing installment ignored");
        return Ok(());
    };
    if inst.status == InstallmentStatus::Paid {
        tracing::debug!(installment_id, "installment already paid");
        return Ok(());
    }

    let now = now_millis();
    tx.execute(
        "UPDATE loan_installments SET status=?1, paid_date=?2 WHERE id=?3",
        params![InstallmentStatus::Paid, now, installment_id],
    )?;
    tx.execute(
        "UPDATE loans SET remaining_amount = remaining_amount - ?1 WHERE id=?2",
        params![inst.amount, inst.loan_id],
    )?;

    let loan = get_loan(&tx, inst.loan_id)?;
    if let Some(account_id) = account_id {
        let category_id = get_or_create_auto(&tx, AutoCategory::Loan, CategoryType::Expense)?;
        let title = loan.as_ref().map(|l| l.title.as_str()).unwrap_or_default();
        post(
            &tx,
            inst.amount,
            now,
            category_id,
            CategoryType::Expense,
            &format!("Loan Installment: {}", title),
            Some(account_id),
        )?;
    }

    if let Some(loan) = loan {
        let pending: i64 = tx.query_row(
            "SELECT COUNT(*) FROM loan_installments WHERE loan_id=?1 AND status=?2",
            params![loan.id, InstallmentStatus::Pending],
            |r| r.get(0),
        )?;
        if loan.remaining_amount <= 0 && pending == 0 && loan.status == LoanStatus::Active {
            tx.execute(
                "UPDATE loans SET status=?1 WHERE id=?2",
                params![LoanStatus::Completed, loan.id],
            )?;
            tracing::info!(loan_id = loan.id, "loan completed");
        }
    }
    tx.commit()?;
    tracing::info!(installment_id, amount = inst.amount, ?account_id, "installment paid");
    Ok(())
}

/// Delete a loan and its installments. Postings made for it are kept.
pub fn delete_loan(conn: &mut Connection, id: i64) -> Result<()> {
    let tx = conn.transaction()?;
    tx.execute("DELETE FROM loan_installments WHERE loan_id=?1", params![id])?;
    tx.execute("DELETE FROM loans WHERE id=?1", params![id])?;
    tx.commit()?;
    tracing::info!(id, "loan deleted");
    Ok(())
}

pub fn get_loans(conn: &Connection) -> Result<Vec<Loan>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM loans ORDER BY start_date DESC, id DESC",
        LOAN_COLUMNS
    ))?;
    let rows = stmt.query_map([], map_loan)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

pub fn get_loan(conn: &Connection, id: i64) -> Result<Option<Loan>> {
    let loan = conn
        .query_row(
            &format!("SELECT {} FROM loans WHERE id=?1", LOAN_COLUMNS),
            params![id],
            map_loan,
        )
        .optional()?;
    Ok(loan)
}

pub fn get_loan_installments(conn: &Connection, loan_id: i64) -> Result<Vec<LoanInstallment>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM loan_installments WHERE loan_id=?1 ORDER BY due_date, id",
        INSTALLMENT_COLUMNS
    ))?;
    let rows = stmt.query_map(params![loan_id], map_installment)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

fn get_installment(conn: &Connection, id: i64) -> Result<Option<LoanInstallment>> {
    let inst = conn
        .query_row(
            &format!(
                "SELECT {} FROM loan_installments WHERE id=?1",
                INSTALLMENT_COLUMNS
            ),
            params![id],
            map_installment,
        )
        .optional()?;
    Ok(inst)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::{date_to_millis, millis_to_date};
    use chrono::NaiveDate;

    #[test]
    fn plan_spreads_flat_interest() {
        let start = date_to_millis(NaiveDate::from_ymd_opt(2025, 1, 15).unwrap());
        let (loan, insts) = plan_loan(
            "Bike",
            Decimal::from(1000),
            Decimal::from(10),
            Frequency::Monthly,
            3,
            start,
            None,
        )
        .unwrap();
        assert_eq!(loan.total_repayable, 1100);
        assert_eq!(loan.installment_amount, 367);
        assert_eq!(
            insts.iter().map(|i| i.amount).collect::<Vec<_>>(),
            [367, 367, 366]
        );
        assert_eq!(
            millis_to_date(insts[0].due_date),
            NaiveDate::from_ymd_opt(2025, 2, 15).unwrap()
        );
        assert_eq!(
            millis_to_date(insts[2].due_date),
            NaiveDate::from_ymd_opt(2025, 4, 15).unwrap()
        );
    }

    #[test]
    fn plan_rejects_bad_inputs() {
        assert!(plan_loan("x", Decimal::ONE, Decimal::ZERO, Frequency::Daily, 0, 0, None).is_err());
        assert!(
            plan_loan("x", Decimal::from(-5), Decimal::ZERO, Frequency::Daily, 2, 0, None).is_err()
        );
        assert!(
            plan_loan("x", Decimal::from(50), Decimal::ZERO, Frequency::Yearly, 2, 0, None).is_err()
        );
    }

    #[test]
    fn plan_never_overshoots_when_rounding_up() {
        let (loan, insts) =
            plan_loan("x", Decimal::from(15), Decimal::ZERO, Frequency::Monthly, 9, 0, None)
                .unwrap();
        assert_eq!(loan.total_repayable, 15);
        assert_eq!(loan.installment_amount, 2);
        assert_eq!(
            insts.iter().map(|i| i.amount).collect::<Vec<_>>(),
            [2, 2, 2, 2, 2, 2, 1, 1, 1]
        );
    }

    #[test]
    fn plan_sums_exactly_for_small_totals() {
        for principal in 0..=60 {
            for count in 1..=12u32 {
                let (loan, insts) = plan_loan(
                    "x",
                    Decimal::from(principal),
                    Decimal::from(7),
                    Frequency::Daily,
                    count,
                    0,
                    None,
                )
                .unwrap();
                let amounts: Vec<i64> = insts.iter().map(|i| i.amount).collect();
                assert_eq!(amounts.len(), count as usize);
                assert_eq!(amounts.iter().sum::<i64>(), loan.total_repayable);
                assert!(amounts.iter().all(|a| *a >= 0));
                let (lo, hi) = (amounts.iter().min().unwrap(), amounts.iter().max().unwrap());
                assert!(hi - lo <= 1, "{principal}/{count}: {amounts:?}");
                if loan.total_repayable >= i64::from(count) {
                    assert!(amounts.iter().all(|a| *a > 0));
                }
            }
        }
    }

    #[test]
    fn plan_monthly_dates_keep_the_start_day() {
        let start = date_to_millis(NaiveDate::from_ymd_opt(2025, 1, 31).unwrap());
        let (_, insts) =
            plan_loan("x", Decimal::from(300), Decimal::ZERO, Frequency::Monthly, 3, start, None)
                .unwrap();
        let dates: Vec<NaiveDate> = insts.iter().map(|i| millis_to_date(i.due_date)).collect();
        assert_eq!(
            dates,
            [
                NaiveDate::from_ymd_opt(2025, 2, 28).unwrap(),
                NaiveDate::from_ymd_opt(2025, 3, 31).unwrap(),
                NaiveDate::from_ymd_opt(2025, 4, 30).unwrap(),
            ]
        );
    }

    #[test]
    fn plan_weekly_steps_seven_days() {
        let (_, insts) =
            plan_loan("x", Decimal::from(70), Decimal::ZERO, Frequency::Weekly, 2, 0, None).unwrap();
        assert_eq!(insts[0].due_date, 7 * 86_400_000);
        assert_eq!(insts[1].due_date, 14 * 86_400_000);
    }
}
