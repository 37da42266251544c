use crate::domain::models::order::{BookingSlot, Order};
use crate::domain::models::venue::Venue;
use crate::error::AppError;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;

/// Half-open interval intersection: `[a_start, a_end)` and `[b_start, b_end)`.
pub fn intervals_overlap(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start < b_end && b_start < a_end
}

/// Active orders among `orders` that would collide with `[start, end)`.
pub fn conflicting<'a>(
    orders: &'a [Order],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    exclude: Option<i64>,
) -> impl Iterator<Item = &'a Order> {
    orders.iter().filter(move |o| {
        o.state.is_active()
            && Some(o.id) != exclude
            && intervals_overlap(o.start_time, o.end_time, start, end)
    })
}

/// The whole slot must sit inside the venue's window for the local day it starts on.
pub fn ensure_within_business_hours(venue: &Venue, slot: &BookingSlot, tz: Tz) -> Result<(), AppError> {
    let local_start = slot.start().with_timezone(&tz).naive_local();
    let local_end = slot.end().with_timezone(&tz).naive_local();
    let (open, close) = venue.business_window(local_start.date());

    if local_start < open || local_end > close {
        return Err(AppError::Validation("Outside business hours".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::order::OrderState;
    use chrono::{Duration, NaiveTime, TimeZone};
    use proptest::prelude::*;

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 3, 4, 0, 0, 0).unwrap()
    }

    fn venue(open: (u32, u32), close: (u32, u32)) -> Venue {
        Venue {
            id: 1,
            name: "Court".into(),
            description: String::new(),
            address: String::new(),
            price: 100,
            open_time: NaiveTime::from_hms_opt(open.0, open.1, 0).unwrap(),
            close_time: NaiveTime::from_hms_opt(close.0, close.1, 0).unwrap(),
            created_at: Utc::now(),
        }
    }

    fn order(id: i64, start_hour: i64, hours: i64, state: OrderState) -> Order {
        let start = base() + Duration::hours(start_hour);
        Order {
            id,
            user_id: "u".into(),
            venue_id: 1,
            order_time: Utc::now(),
            start_time: start,
            end_time: start + Duration::hours(hours),
            hours: hours as i32,
            total: hours * 100,
            state,
        }
    }

    fn slot(hour: u32, hours: i32) -> BookingSlot {
        let start = Utc.with_ymd_and_hms(2030, 3, 4, hour, 0, 0).unwrap();
        BookingSlot::new(start, hours, base() - Duration::days(1)).unwrap()
    }

    #[test]
    fn test_adjacent_intervals_do_not_overlap() {
        let t = base();
        assert!(!intervals_overlap(t, t + Duration::hours(2), t + Duration::hours(2), t + Duration::hours(4)));
        assert!(intervals_overlap(t, t + Duration::hours(2), t + Duration::hours(1), t + Duration::hours(3)));
        assert!(intervals_overlap(t, t + Duration::hours(5), t + Duration::hours(1), t + Duration::hours(2)));
    }

    #[test]
    fn test_conflicting_ignores_inactive_and_excluded() {
        let orders = vec![
            order(1, 10, 2, OrderState::Pending),
            order(2, 10, 2, OrderState::Rejected),
            order(3, 11, 1, OrderState::Finished),
            order(4, 11, 2, OrderState::Approved),
        ];
        let start = base() + Duration::hours(10);
        let end = start + Duration::hours(2);

        let ids: Vec<i64> = conflicting(&orders, start, end, None).map(|o| o.id).collect();
        assert_eq!(ids, vec![1, 4]);

        let ids: Vec<i64> = conflicting(&orders, start, end, Some(1)).map(|o| o.id).collect();
        assert_eq!(ids, vec![4]);
    }

    #[test]
    fn test_business_hours_containment() {
        let v = venue((9, 0), (22, 0));
        assert!(ensure_within_business_hours(&v, &slot(9, 2), chrono_tz::UTC).is_ok());
        assert!(ensure_within_business_hours(&v, &slot(20, 2), chrono_tz::UTC).is_ok());

        let err = ensure_within_business_hours(&v, &slot(21, 2), chrono_tz::UTC).unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m == "Outside business hours"));
        assert!(ensure_within_business_hours(&v, &slot(8, 2), chrono_tz::UTC).is_err());
        assert!(ensure_within_business_hours(&v, &slot(23, 1), chrono_tz::UTC).is_err());
    }

    #[test]
    fn test_full_day_venue_fits_24_hours() {
        let v = venue((0, 0), (23, 59));
        assert!(ensure_within_business_hours(&v, &slot(0, 24), chrono_tz::UTC).is_ok());
        assert!(ensure_within_business_hours(&v, &slot(1, 24), chrono_tz::UTC).is_err());
    }

    #[test]
    fn test_business_hours_use_local_time() {
        // 08:00 UTC is 09:00 in Berlin during winter.
        let v = venue((9, 0), (22, 0));
        let berlin: Tz = "Europe/Berlin".parse().unwrap();
        assert!(ensure_within_business_hours(&v, &slot(8, 2), berlin).is_ok());
        assert!(ensure_within_business_hours(&v, &slot(20, 2), berlin).is_err());
    }

    proptest! {
        #[test]
        fn prop_overlap_is_symmetric(a in 0i64..500, la in 1i64..=24, b in 0i64..500, lb in 1i64..=24) {
            let t = base();
            let (a0, a1) = (t + Duration::hours(a), t + Duration::hours(a + la));
            let (b0, b1) = (t + Duration::hours(b), t + Duration::hours(b + lb));
            prop_assert_eq!(intervals_overlap(a0, a1, b0, b1), intervals_overlap(b0, b1, a0, a1));
        }

        #[test]
        fn prop_admitted_orders_never_overlap(
            requests in proptest::collection::vec((0i64..200, 1i64..=24), 1..60)
        ) {
            let mut admitted: Vec<Order> = Vec::new();
            for (i, (start, hours)) in requests.into_iter().enumerate() {
                let candidate = order(i as i64, start, hours, OrderState::Pending);
                if conflicting(&admitted, candidate.start_time, candidate.end_time, None).next().is_none() {
                    admitted.push(candidate);
                }
            }

            for (i, a) in admitted.iter().enumerate() {
                for b in admitted.iter().skip(i + 1) {
                    prop_assert!(!intervals_overlap(a.start_time, a.end_time, b.start_time, b.end_time));
                }
            }
        }
    }
}
