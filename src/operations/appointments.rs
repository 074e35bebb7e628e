//! Appointment booking.

use tracing::info;

use super::OperationError;
use crate::{
    context::AppContext,
    db::{self, DbConnection, SlotKey, is_unique_violation},
    models::{Appointment, NewAppointment},
};

/// Result of a booking attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppointmentOutcome {
    /// The booking was stored.
    Created(Appointment),
    /// The patient already holds this date and time slot; nothing was stored.
    AlreadyExists,
}

/// Book a slot unless the patient already holds it.
///
/// New bookings always start unapproved, whatever the caller supplied.
///
/// # Errors
/// Returns [`OperationError::Unavailable`] when the store fails.
pub async fn make_appointment(
    ctx: &AppContext,
    booking: NewAppointment,
) -> Result<AppointmentOutcome, OperationError> {
    let booking = NewAppointment {
        approved: false,
        ..booking
    };
    let slot = SlotKey {
        email: &booking.email,
        date: &booking.date,
        timeslot: &booking.timeslot,
    };
    let mut conn = ctx.conn().await?;
    if db::find_appointment(&mut conn, slot).await?.is_some() {
        info!(email = %booking.email, date = %booking.date, "appointment slot already booked");
        return Ok(AppointmentOutcome::AlreadyExists);
    }
    store_booking(&mut conn, &booking).await
}

/// Insert `booking`, treating a slot claimed by a concurrent request as an
/// existing booking.
async fn store_booking(
    conn: &mut DbConnection,
    booking: &NewAppointment,
) -> Result<AppointmentOutcome, OperationError> {
    match db::create_appointment(conn, booking).await {
        Ok(stored) => {
            info!(id = stored.id, hospital = %stored.hospital, "appointment created");
            Ok(AppointmentOutcome::Created(stored))
        }
        Err(e) if is_unique_violation(&e) => {
            info!(email = %booking.email, "appointment slot claimed concurrently");
            Ok(AppointmentOutcome::AlreadyExists)
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(all(test, feature = "sqlite"))]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::db::migrated_memory_store;

    fn booking() -> NewAppointment {
        NewAppointment {
            name: "Ada".into(),
            email: "ada@example.com".into(),
            phone: "123".into(),
            hospital: "City Hospital".into(),
            department: "Surgery".into(),
            date: "2024-07-01".into(),
            timeslot: "09:00-10:00".into(),
            approved: false,
        }
    }

    #[rstest]
    #[tokio::test]
    async fn slot_claimed_after_the_lookup_is_already_exists() {
        let mut conn = migrated_memory_store().await;
        db::create_appointment(&mut conn, &booking())
            .await
            .expect("competing insert");

        let outcome = store_booking(&mut conn, &booking()).await.expect("outcome");

        assert_eq!(outcome, AppointmentOutcome::AlreadyExists);
        assert_eq!(db::count_appointments(&mut conn).await.expect("count"), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn free_slot_is_created() {
        let mut conn = migrated_memory_store().await;
        let outcome = store_booking(&mut conn, &booking()).await.expect("outcome");
        assert!(matches!(outcome, AppointmentOutcome::Created(ref a) if a.email == "ada@example.com"));
    }
}
