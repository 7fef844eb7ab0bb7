//! Replies for the balance query command.

use rank_common::BalanceRecord;

/// Currency name that is shown without a label when it is the only one.
pub const DEFAULT_CURRENCY: &str = "default";

/// Reply when the target user has no account binding.
pub fn account_not_found(target_name: &str) -> String {
    format!("未找到用户 {} 的账户信息。", target_name)
}

/// Describe the balances of one owner.
///
/// `records` must already be restricted to the owner, and to `currency` when
/// one was requested.
pub fn describe_balances(
    target_name: &str,
    records: &[BalanceRecord],
    currency: Option<&str>,
) -> String {
    if let Some(currency) = currency {
        return match records.first() {
            Some(record) => format!(
                "{} 的 {} 货币余额为 {}",
                target_name, currency, record.amount
            ),
            None => format!("{} 没有 {} 货币的记录。", target_name, currency),
        };
    }

    match records {
        [] => format!("{} 没有任何货币记录。", target_name),
        [only] if only.currency_kind == DEFAULT_CURRENCY => {
            format!("{} 的货币余额为 {}", target_name, only.amount)
        }
        _ => {
            let lines: Vec<String> = records
                .iter()
                .map(|r| format!("{}: {}", r.currency_kind, r.amount))
                .collect();
            format!("{} 的货币余额：\n{}", target_name, lines.join("\n"))
        }
    }
}
