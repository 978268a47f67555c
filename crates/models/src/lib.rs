pub mod errors;
pub mod db;
pub mod company;
pub mod user;
pub mod user_credentials;
pub mod category;
pub mod product;
pub mod expense;
pub mod sale;
pub mod sale_item;
pub mod monthly_revenue;

#[cfg(test)]
mod tests;
