mod agents;
mod listing_detail;
mod listings;
mod login;
mod overview;
mod payments;
mod plans;
mod profile;
mod property_types;
mod user_detail;
mod users;

pub use agents::AgentsView;
pub use listing_detail::ListingDetailView;
pub use listings::ListingsView;
pub use login::LoginView;
pub use overview::OverviewView;
pub use payments::PaymentsView;
pub use plans::PlansView;
pub use profile::ProfileView;
pub use property_types::PropertyTypesView;
pub use user_detail::UserDetailView;
pub use users::UsersView;
