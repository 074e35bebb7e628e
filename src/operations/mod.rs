//! Named query and mutation operations.
//!
//! Each operation maps onto a single collection read or write and returns
//! `Result<T, OperationError>`. The REST handlers and GraphQL resolvers are
//! thin adapters over these functions, so behaviour is identical whichever
//! surface a page calls.

mod accounts;
mod appointments;
mod blogs;
mod chat;
mod error;
mod hospitals;
mod records;

pub use self::{
    accounts::{
        GoogleLogin,
        GoogleProfile,
        MIN_PASSWORD_LEN,
        SignupForm,
        is_valid_email,
        login,
        login_google,
        signup,
        verify_email,
    },
    appointments::{AppointmentOutcome, make_appointment},
    blogs::{BlogDraft, all_blogs, create_blog, search_blogs},
    chat::bot_response,
    error::{OperationError, StoreError},
    hospitals::{all_hospitals, hospitals_by_department, hospitals_by_name},
    records::{add_one_record, add_records, all_records, delete_record, parse_id, search_records},
};
