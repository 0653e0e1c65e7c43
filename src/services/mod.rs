pub mod crm;
pub mod google_ads;
pub mod property_feed;
