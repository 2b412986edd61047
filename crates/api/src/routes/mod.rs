mod misc;
mod referrals;

pub use misc::{misc_routes, route_not_found};
pub use referrals::referral_routes;
