//! Budget period labels
//!
//! A period is advisory metadata attached to a budget. Aggregation always
//! uses the budget's explicit start/end window, never the period.

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Coarse label describing the length of a budget window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum BudgetPeriod {
    Weekly,
    #[default]
    Monthly,
    Quarterly,
    Yearly,
    Custom,
}

impl BudgetPeriod {
    pub const ALL: [BudgetPeriod; 5] = [
        Self::Weekly,
        Self::Monthly,
        Self::Quarterly,
        Self::Yearly,
        Self::Custom,
    ];

    /// Classify a date window by the number of days between its endpoints.
    ///
    /// `d = end - start` in days:
    /// `d <= 7` weekly, `<= 31` monthly, `<= 93` quarterly, `<= 366` yearly,
    /// anything longer is custom. A reversed window yields a negative `d`
    /// and therefore classifies as weekly.
    ///
    /// # Examples
    /// ```
    /// use budget_ledger::models::BudgetPeriod;
    /// use chrono::NaiveDate;
    ///
    /// let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    /// let end = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
    /// assert_eq!(BudgetPeriod::classify(start, end), BudgetPeriod::Monthly);
    /// ```
    pub fn classify(start: NaiveDate, end: NaiveDate) -> Self {
        let days = (end - start).num_days();
        match days {
            d if d <= 7 => Self::Weekly,
            d if d <= 31 => Self::Monthly,
            d if d <= 93 => Self::Quarterly,
            d if d <= 366 => Self::Yearly,
            _ => Self::Custom,
        }
    }

    /// Default inclusive end date for a window of this period starting at `start`.
    ///
    /// Returns `None` for `Custom`, which has no natural length.
    pub fn default_end(&self, start: NaiveDate) -> Option<NaiveDate> {
        let months = match self {
            Self::Weekly => return start.checked_add_days(chrono::Days::new(6)),
            Self::Monthly => 1,
            Self::Quarterly => 3,
            Self::Yearly => 12,
            Self::Custom => return None,
        };
        start
            .checked_add_months(Months::new(months))
            .and_then(|d| d.pred_opt())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weekly => "WEEKLY",
            Self::Monthly => "MONTHLY",
            Self::Quarterly => "QUARTERLY",
            Self::Yearly => "YEARLY",
            Self::Custom => "CUSTOM",
        }
    }
}

impl fmt::Display for BudgetPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BudgetPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "weekly" | "week" | "w" => Ok(Self::Weekly),
            "monthly" | "month" | "m" => Ok(Self::Monthly),
            "quarterly" | "quarter" | "q" => Ok(Self::Quarterly),
            "yearly" | "year" | "annual" | "y" => Ok(Self::Yearly),
            "custom" | "c" => Ok(Self::Custom),
            other => Err(format!("Unknown budget period: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_classify_boundaries() {
        let start = d(2024, 1, 1);
        assert_eq!(BudgetPeriod::classify(start, start), BudgetPeriod::Weekly);
        assert_eq!(BudgetPeriod::classify(start, d(2024, 1, 8)), BudgetPeriod::Weekly);
        assert_eq!(BudgetPeriod::classify(start, d(2024, 1, 9)), BudgetPeriod::Monthly);
        assert_eq!(BudgetPeriod::classify(start, d(2024, 2, 1)), BudgetPeriod::Monthly);
        assert_eq!(BudgetPeriod::classify(start, d(2024, 2, 2)), BudgetPeriod::Quarterly);
        // 93 days after Jan 1 2024 (leap year) is Apr 3
        assert_eq!(BudgetPeriod::classify(start, d(2024, 4, 3)), BudgetPeriod::Quarterly);
        assert_eq!(BudgetPeriod::classify(start, d(2024, 4, 4)), BudgetPeriod::Yearly);
        // 366 days after Jan 1 2024 is Jan 1 2025
        assert_eq!(BudgetPeriod::classify(start, d(2025, 1, 1)), BudgetPeriod::Yearly);
        assert_eq!(BudgetPeriod::classify(start, d(2025, 1, 2)), BudgetPeriod::Custom);
    }

    #[test]
    fn test_classify_reversed_window() {
        assert_eq!(
            BudgetPeriod::classify(d(2024, 3, 1), d(2024, 1, 1)),
            BudgetPeriod::Weekly
        );
    }

    #[test]
    fn test_default_end() {
        let start = d(2024, 1, 1);
        assert_eq!(BudgetPeriod::Weekly.default_end(start), Some(d(2024, 1, 7)));
        assert_eq!(BudgetPeriod::Monthly.default_end(start), Some(d(2024, 1, 31)));
        assert_eq!(BudgetPeriod::Quarterly.default_end(start), Some(d(2024, 3, 31)));
        assert_eq!(BudgetPeriod::Yearly.default_end(start), Some(d(2024, 12, 31)));
        assert_eq!(BudgetPeriod::Custom.default_end(start), None);
    }

    #[test]
    fn test_parse_and_display() {
        for period in BudgetPeriod::ALL {
            assert_eq!(period.to_string().parse::<BudgetPeriod>().unwrap(), period);
        }
        assert_eq!("annual".parse::<BudgetPeriod>().unwrap(), BudgetPeriod::Yearly);
        assert!("fortnightly".parse::<BudgetPeriod>().is_err());
    }

    #[test]
    fn test_serialization() {
        let json = serde_json::to_string(&BudgetPeriod::Quarterly).unwrap();
        assert_eq!(json, "\"QUARTERLY\"");
    }
}
