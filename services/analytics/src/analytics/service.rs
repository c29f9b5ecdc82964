//! 分析服务：日期范围推导与占位统计数据。

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, Timelike};
use serde::Serialize;

/// 未指定 period 时的默认统计周期。
pub(crate) const DEFAULT_PERIOD: &str = "month";

/// 统计周期回溯窗口。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Period {
    Day,
    Week,
    Month,
    Year,
}

impl Period {
    /// 解析 period；无法识别的值按一年处理。
    pub(crate) fn parse(raw: &str) -> Self {
        match raw {
            "day" => Self::Day,
            "week" => Self::Week,
            "month" => Self::Month,
            _ => Self::Year,
        }
    }

    fn lookback(self) -> Duration {
        match self {
            Self::Day => Duration::days(1),
            Self::Week => Duration::weeks(1),
            Self::Month => Duration::days(30),
            Self::Year => Duration::days(365),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct DateRange {
    pub(crate) start: String,
    pub(crate) end: String,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct RevenueStats {
    pub(crate) total: f64,
    pub(crate) growth_rate: f64,
    pub(crate) daily_average: f64,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct OrderStats {
    pub(crate) total: u64,
    pub(crate) completed: u64,
    pub(crate) cancelled: u64,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct UserStats {
    pub(crate) total_active: u64,
    pub(crate) new_users: u64,
}

/// 仪表盘统计。
#[derive(Debug, Clone, Serialize)]
pub(crate) struct DashboardStats {
    pub(crate) period: String,
    pub(crate) date_range: DateRange,
    pub(crate) revenue: RevenueStats,
    pub(crate) orders: OrderStats,
    pub(crate) users: UserStats,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct PurchaseHistory {
    pub(crate) total_orders: u64,
    pub(crate) total_spent: f64,
}

/// 用户行为分析结果。
#[derive(Debug, Clone, Serialize)]
pub(crate) struct UserBehavior {
    pub(crate) user_id: i64,
    pub(crate) behavior_score: f64,
    pub(crate) purchase_history: PurchaseHistory,
}

/// 分析服务（无状态；统计数值为占位，尚未接入数据源）。
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct AnalyticsService;

impl AnalyticsService {
    /// 仪表盘统计：同时给出 start/end 时使用显式范围，否则以 `now` 为终点按 period 回溯。
    pub(crate) fn dashboard_stats(
        &self,
        period: &str,
        start_date: Option<&str>,
        end_date: Option<&str>,
        now: NaiveDateTime,
    ) -> Result<DashboardStats, String> {
        let start_date = start_date.filter(|raw| !raw.trim().is_empty());
        let end_date = end_date.filter(|raw| !raw.trim().is_empty());
        let (start, end) = match (start_date, end_date) {
            (Some(start), Some(end)) => {
                let start = parse_iso_datetime(start)
                    .ok_or_else(|| format!("invalid start_date: {start}"))?;
                let end =
                    parse_iso_datetime(end).ok_or_else(|| format!("invalid end_date: {end}"))?;
                if start.instant() > end.instant() {
                    return Err("start_date must not be after end_date".to_string());
                }
                (start.to_iso_string(), end.to_iso_string())
            }
            _ => (
                format_iso_datetime(now - Period::parse(period).lookback()),
                format_iso_datetime(now),
            ),
        };

        Ok(DashboardStats {
            period: period.to_string(),
            date_range: DateRange { start, end },
            revenue: RevenueStats {
                total: 50000.00,
                growth_rate: 15.5,
                daily_average: 1666.67,
            },
            orders: OrderStats {
                total: 1000,
                completed: 900,
                cancelled: 40,
            },
            users: UserStats {
                total_active: 500,
                new_users: 50,
            },
        })
    }

    /// 用户行为分析。
    pub(crate) fn user_behavior(&self, user_id: i64) -> UserBehavior {
        UserBehavior {
            user_id,
            behavior_score: 85.5,
            purchase_history: PurchaseHistory {
                total_orders: 10,
                total_spent: 500.00,
            },
        }
    }
}

/// 调用方传入的日期时间：保留原始墙钟时间与可选时区偏移。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct IsoDateTime {
    local: NaiveDateTime,
    offset: Option<FixedOffset>,
}

impl IsoDateTime {
    /// 比较用时刻：带偏移的值换算到 UTC，不带偏移的按原值。
    pub(crate) fn instant(&self) -> NaiveDateTime {
        match self.offset {
            Some(offset) => self.local - Duration::seconds(i64::from(offset.local_minus_utc())),
            None => self.local,
        }
    }

    /// 按输入形态回写，偏移原样保留（如 `+09:00`）。
    pub(crate) fn to_iso_string(&self) -> String {
        let local = format_iso_datetime(self.local);
        match self.offset {
            Some(offset) => format!("{local}{offset}"),
            None => local,
        }
    }
}

/// 解析 ISO-8601 日期或日期时间。
pub(crate) fn parse_iso_datetime(raw: &str) -> Option<IsoDateTime> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(IsoDateTime {
            local: parsed.naive_local(),
            offset: Some(*parsed.offset()),
        });
    }
    let naive = |local| IsoDateTime {
        local,
        offset: None,
    };
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive(parsed));
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(naive)
}

/// 输出 `YYYY-MM-DDTHH:MM:SS[.ffffff]`，无亚秒部分时省略小数。
pub(crate) fn format_iso_datetime(value: NaiveDateTime) -> String {
    if value.nanosecond() == 0 {
        value.format("%Y-%m-%dT%H:%M:%S").to_string()
    } else {
        value.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
    }
}
