//! Warranty date arithmetic and status derivation
//!
//! Status is derived at read time, never stored. The suspended flag wins over
//! date arithmetic; an expired warranty is one whose expiration date is
//! strictly before today; everything else is in force (vigente), with an
//! expiring-soon marker inside the 90-day window.

use chrono::{Months, NaiveDate};

use crate::domain::entities::{UnitWarranty, WarrantyCategory, WarrantyStatus};

/// Days before expiration at which a warranty counts as expiring soon
pub const EXPIRING_SOON_DAYS: i64 = 90;

/// Expiration of a warranty started on `start_date` for the given category.
///
/// Calendar-month arithmetic: 2025-01-01 + 5 years lands on 2030-01-01.
/// Month-end overflow clamps (2025-01-31 + 1 month → 2025-02-28).
pub fn compute_expiration(start_date: NaiveDate, category: &WarrantyCategory) -> NaiveDate {
    start_date
        .checked_add_months(Months::new(category.term_in_months()))
        .unwrap_or(NaiveDate::MAX)
}

/// Derived status of a warranty as of `today`
pub fn status_on(warranty: &UnitWarranty, today: NaiveDate) -> WarrantyStatus {
    if warranty.suspended {
        WarrantyStatus::Suspensa
    } else if warranty.expiration_date < today {
        WarrantyStatus::Expirada
    } else {
        WarrantyStatus::Vigente
    }
}

/// Whether a warranty is in force and inside the expiring-soon window:
/// `0 <= (expiration - today) < 90` days.
pub fn is_expiring_soon(warranty: &UnitWarranty, today: NaiveDate) -> bool {
    if status_on(warranty, today) != WarrantyStatus::Vigente {
        return false;
    }
    let remaining = (warranty.expiration_date - today).num_days();
    (0..EXPIRING_SOON_DAYS).contains(&remaining)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use obra_common::{TenantId, UnitId, WarrantyCategoryId};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn warranty_expiring(expiration: NaiveDate) -> UnitWarranty {
        UnitWarranty::new(
            UnitId::new(),
            WarrantyCategoryId::new(),
            date(2020, 1, 1),
            expiration,
        )
    }

    fn category(years: i32, months: i32) -> WarrantyCategory {
        WarrantyCategory::new(TenantId::new(), "Estrutura".to_string(), years, months)
    }

    #[test]
    fn test_expiration_five_years() {
        assert_eq!(
            compute_expiration(date(2025, 1, 1), &category(5, 0)),
            date(2030, 1, 1)
        );
    }

    #[test]
    fn test_expiration_ten_years() {
        assert_eq!(
            compute_expiration(date(2025, 1, 1), &category(10, 0)),
            date(2035, 1, 1)
        );
    }

    #[test]
    fn test_expiration_years_plus_months() {
        assert_eq!(
            compute_expiration(date(2025, 1, 1), &category(1, 6)),
            date(2026, 7, 1)
        );
    }

    #[test]
    fn test_expiration_month_end_clamps() {
        assert_eq!(
            compute_expiration(date(2025, 1, 31), &category(0, 1)),
            date(2025, 2, 28)
        );
    }

    #[test]
    fn test_status_vigente() {
        let today = date(2026, 8, 30);
        let w = warranty_expiring(today + Duration::days(365));
        assert_eq!(status_on(&w, today), WarrantyStatus::Vigente);
    }

    #[test]
    fn test_status_expirada_strictly_before_today() {
        let today = date(2026, 8, 30);
        let w = warranty_expiring(today - Duration::days(1));
        assert_eq!(status_on(&w, today), WarrantyStatus::Expirada);

        // expiring today is still in force
        let w = warranty_expiring(today);
        assert_eq!(status_on(&w, today), WarrantyStatus::Vigente);
    }

    #[test]
    fn test_suspensa_wins_over_dates() {
        let today = date(2026, 8, 30);

        let mut expired = warranty_expiring(today - Duration::days(400));
        expired.suspend(None);
        assert_eq!(status_on(&expired, today), WarrantyStatus::Suspensa);

        let mut current = warranty_expiring(today + Duration::days(400));
        current.suspend(Some("Obra no imóvel".to_string()));
        assert_eq!(status_on(&current, today), WarrantyStatus::Suspensa);
    }

    #[test]
    fn test_expiring_soon_boundaries() {
        let today = date(2026, 8, 30);

        // 89 days out: soon
        assert!(is_expiring_soon(&warranty_expiring(today + Duration::days(89)), today));
        // 90 days out: not soon
        assert!(!is_expiring_soon(&warranty_expiring(today + Duration::days(90)), today));
        // expires today: soon, and still vigente
        let w = warranty_expiring(today);
        assert!(is_expiring_soon(&w, today));
        assert_eq!(status_on(&w, today), WarrantyStatus::Vigente);
        // already expired: not soon
        assert!(!is_expiring_soon(&warranty_expiring(today - Duration::days(1)), today));
    }

    #[test]
    fn test_suspended_never_expiring_soon() {
        let today = date(2026, 8, 30);
        let mut w = warranty_expiring(today + Duration::days(30));
        w.suspend(None);
        assert!(!is_expiring_soon(&w, today));
    }
}
