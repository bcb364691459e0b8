//! Demo bookings used to populate a fresh registry.

use crate::booking::{Booking, Quotable};
use crate::model::{PackageSize, TaskType};

/// Three quoted bookings, one per task type.
#[must_use]
pub fn sample_bookings() -> Vec<Booking> {
    let mut bookings = vec![
        Booking::removal("Riley Martin", "123 Main St", "456 Oak Ave", 5).titled("House move"),
        Booking::delivery("Firas Al-Doghman", "789 Pine St", PackageSize::Large)
            .titled("Furniture delivery"),
        Booking::new("Mike Tyson", TaskType::Transport)
            .titled("Piano")
            .described("Piano transport"),
    ];
    for booking in &mut bookings {
        booking.calculate_quote();
    }
    bookings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::{Bookable, GENERAL_QUOTE_RANGE};
    use crate::model::BookingStatus;

    #[test]
    fn one_quoted_pending_booking_per_task_type() {
        let bookings = sample_bookings();
        let types: Vec<TaskType> = bookings.iter().map(Booking::task_type).collect();
        assert_eq!(
            types,
            [TaskType::Removal, TaskType::Delivery, TaskType::Transport]
        );
        let costs: Vec<f64> = bookings.iter().map(Quotable::estimated_cost).collect();
        assert!(matches!(costs.as_slice(), [removal, delivery, transport]
            if (*removal - 225.0).abs() < f64::EPSILON
                && (*delivery - 150.0).abs() < f64::EPSILON
                && GENERAL_QUOTE_RANGE.contains(transport)));
        assert!(
            bookings
                .iter()
                .all(|booking| booking.status() == BookingStatus::Pending)
        );
    }
}
