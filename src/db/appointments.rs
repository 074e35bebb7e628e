//! Appointment collection helpers.

use diesel::{prelude::*, result::QueryResult};
use diesel_async::RunQueryDsl;

use super::connection::DbConnection;
use crate::models::{Appointment, NewAppointment};

/// Identifies a booking slot: one patient email per date and time slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotKey<'a> {
    /// Patient email.
    pub email: &'a str,
    /// Requested date.
    pub date: &'a str,
    /// Requested time slot.
    pub timeslot: &'a str,
}

/// Find the booking occupying `slot`, if any.
///
/// # Errors
/// Returns any error produced by the underlying database query.
pub async fn find_appointment(
    conn: &mut DbConnection,
    slot: SlotKey<'_>,
) -> QueryResult<Option<Appointment>> {
    use crate::schema::appointments::dsl as a;
    a::appointments
        .filter(a::email.eq(slot.email))
        .filter(a::date.eq(slot.date))
        .filter(a::timeslot.eq(slot.timeslot))
        .first::<Appointment>(conn)
        .await
        .optional()
}

/// Insert a booking and return the stored row.
///
/// An occupied slot surfaces as a `UniqueViolation` database error.
///
/// # Errors
/// Returns any error produced by the insertion query.
pub async fn create_appointment(
    conn: &mut DbConnection,
    appointment: &NewAppointment,
) -> QueryResult<Appointment> {
    use crate::schema::appointments::dsl::appointments;
    diesel::insert_into(appointments)
        .values(appointment)
        .get_result(conn)
        .await
}

/// Count stored bookings.
///
/// # Errors
/// Returns any error produced by the count query.
pub async fn count_appointments(conn: &mut DbConnection) -> QueryResult<i64> {
    use crate::schema::appointments::dsl::appointments;
    appointments.count().get_result(conn).await
}
