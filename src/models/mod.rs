pub mod activities;
pub mod activity_attendees;
pub mod comments;
pub mod photos;
pub mod user_profiles;
pub mod user_tokens;
pub mod users;

pub use activities::{ActivitiesRow, UserActivityRow};
pub use activity_attendees::{ActivityAttendeesRow, AttendeeProfileRow};
pub use comments::CommentsRow;
pub use photos::PhotosRow;
pub use user_profiles::UserProfilesRow;
pub use user_tokens::UserTokensRow;
pub use users::UsersRow;
