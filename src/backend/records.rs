use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{
    Company, Customer, FileRecord, FileRecordCreate, Order, OrderCreate, PricingRule,
    PricingRuleCreate, Profile,
};
use crate::table_framework::Record;

impl Record for Customer {
    const TABLE: &'static str = "customers";
    type Create = Customer;

    /// Customers are keyed by their auth user id, so the row is inserted as given.
    fn from_create(_id: Uuid, _created_at: DateTime<Utc>, payload: Customer) -> Result<Self, String> {
        Ok(payload)
    }
}

impl Record for Order {
    const TABLE: &'static str = "orders";
    type Create = OrderCreate;

    fn from_create(id: Uuid, created_at: DateTime<Utc>, payload: OrderCreate) -> Result<Self, String> {
        if payload.quantity == 0 {
            return Err("orders.quantity must be positive".to_string());
        }
        Ok(Self {
            id,
            customer_id: payload.customer_id,
            title: payload.title,
            product_type: payload.product_type,
            quantity: payload.quantity,
            paper_type: payload.paper_type,
            finishing: payload.finishing,
            turnaround: payload.turnaround,
            location: payload.location,
            notes: payload.notes,
            standard_price: payload.standard_price,
            rush_price: payload.rush_price,
            final_price: payload.final_price,
            status: payload.status,
            created_at,
        })
    }
}

impl Record for PricingRule {
    const TABLE: &'static str = "pricing_rules";
    type Create = PricingRuleCreate;

    fn from_create(id: Uuid, _created_at: DateTime<Utc>, payload: PricingRuleCreate) -> Result<Self, String> {
        Ok(Self {
            id,
            product_type: payload.product_type,
            paper_type: payload.paper_type,
            paper_cost_per_sheet: payload.paper_cost_per_sheet,
            setup_minutes: payload.setup_minutes,
            run_speed_per_hour: payload.run_speed_per_hour,
            press_rate_per_hour: payload.press_rate_per_hour,
            markup: payload.markup,
            rush_multiplier: payload.rush_multiplier,
        })
    }
}

impl Record for FileRecord {
    const TABLE: &'static str = "files";
    type Create = FileRecordCreate;

    fn from_create(id: Uuid, created_at: DateTime<Utc>, payload: FileRecordCreate) -> Result<Self, String> {
        Ok(Self {
            id,
            bucket: payload.bucket,
            path: payload.path,
            job_id: payload.job_id,
            user_id: payload.user_id,
            file_name: payload.file_name,
            file_type: payload.file_type,
            size: payload.size,
            created_at,
        })
    }
}

impl Record for Profile {
    const TABLE: &'static str = "profiles";
    type Create = Profile;

    fn from_create(_id: Uuid, _created_at: DateTime<Utc>, payload: Profile) -> Result<Self, String> {
        Ok(payload)
    }
}

impl Record for Company {
    const TABLE: &'static str = "companies";
    type Create = Company;

    fn from_create(_id: Uuid, _created_at: DateTime<Utc>, payload: Company) -> Result<Self, String> {
        Ok(payload)
    }
}
