use std::time::Duration;

use deadpool_postgres::{Config, ManagerConfig, Pool, PoolConfig, RecyclingMethod, Runtime};
use tokio_postgres::types::ToSql;
use tokio_postgres::NoTls;
use uuid::Uuid;

use crate::config::DatabaseConfig;
use crate::constants::vendor_defaults::VendorTypeSeed;
use crate::constants::{
    DocumentStatus, OrderStatus, PaymentGateway, PaymentMethod, TransactionType, UserRole,
    VendorStatus,
};
use crate::dto::{
    AddressRequest, PaymentRequest, ProductFilterQuery, SortOrder, SupportReplyRequest,
    VendorDocumentVerificationRequest,
};
use crate::models::{
    Address, Driver, Order, Product, RoleCount, SupportReply, User, Vendor, VendorDocument,
    VendorType, WalletTransaction,
};

/// Database connection pool
pub type DbPool = Pool;

/// Result of a document review; the not-found variants leave nothing written
#[derive(Debug)]
pub enum DocumentReview {
    Reviewed {
        document: VendorDocument,
        vendor_status: VendorStatus,
        activated: bool,
    },
    VendorNotFound,
    DocumentNotFound,
}

#[derive(Debug)]
pub enum SupportReplyOutcome {
    Created(SupportReply),
    TicketNotFound,
    TicketClosed,
}

pub type DbResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

pub type SqlParam = Box<dyn ToSql + Sync + Send>;

const INITIAL_SCHEMA: &str = include_str!("../../migrations/V1__initial_schema.sql");

const USER_COLUMNS: &str = "id, name, email, phone, role, is_active, created_at";
const DRIVER_COLUMNS: &str = "id, user_id, vehicle_type, license_plate, is_available, \
    current_latitude, current_longitude, rating, created_at";
const VENDOR_TYPE_COLUMNS: &str = "id, name, slug, description, is_active, created_at";
const VENDOR_COLUMNS: &str = "id, user_id, vendor_type_id, business_name, status, commission_rate, \
    delivery_radius_km, min_order_amount, preparation_time_minutes, rating, created_at, updated_at";
const DOCUMENT_COLUMNS: &str = "id, vendor_id, document_type, file_url, status, rejection_reason, \
    notes, reviewed_at, expires_at, created_at";
const PRODUCT_COLUMNS: &str = "p.id, p.vendor_id, p.name, p.description, p.price, p.is_available, \
    p.is_vegetarian, p.rating, p.created_at";
const ORDER_COLUMNS: &str = "id, order_number, customer_id, vendor_id, driver_id, status, \
    total_amount, payment_method, created_at, updated_at";
const TRANSACTION_COLUMNS: &str = "id, user_id, order_id, amount, currency, transaction_type, \
    payment_method, gateway, gateway_reference, status, created_at";
const ADDRESS_COLUMNS: &str = "id, user_id, label, street, city, state, postal_code, country, \
    latitude, longitude, floor, apartment, landmark, instructions, is_default, created_at";
const REPLY_COLUMNS: &str = "id, ticket_id, message, attachments, is_internal, created_at";

/// Escape LIKE wildcards in user input and wrap it for a substring match
pub fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// WHERE clause and parameters for a product search.
///
/// Only products of active vendors are listed. Placeholders are numbered from
/// `$1` in the order the parameters are returned.
pub fn build_product_filter(filter: &ProductFilterQuery) -> (String, Vec<SqlParam>) {
    let mut conditions: Vec<String> = vec!["v.status = 'active'".to_string()];
    let mut params: Vec<SqlParam> = Vec::new();

    if let Some(search) = &filter.search {
        params.push(Box::new(like_pattern(search)));
        let n = params.len();
        conditions.push(format!("(p.name ILIKE ${n} OR p.description ILIKE ${n})"));
    }
    if let Some(vendor_id) = filter.vendor_id {
        params.push(Box::new(vendor_id));
        conditions.push(format!("p.vendor_id = ${}", params.len()));
    }
    if let Some(vendor_type_id) = filter.vendor_type_id {
        params.push(Box::new(vendor_type_id));
        conditions.push(format!("v.vendor_type_id = ${}", params.len()));
    }
    if let Some(min_price) = filter.min_price {
        params.push(Box::new(min_price));
        conditions.push(format!("p.price >= ${}", params.len()));
    }
    if let Some(max_price) = filter.max_price {
        params.push(Box::new(max_price));
        conditions.push(format!("p.price <= ${}", params.len()));
    }
    if let Some(is_available) = filter.is_available {
        params.push(Box::new(is_available));
        conditions.push(format!("p.is_available = ${}", params.len()));
    }
    if let Some(is_vegetarian) = filter.is_vegetarian {
        params.push(Box::new(is_vegetarian));
        conditions.push(format!("p.is_vegetarian = ${}", params.len()));
    }

    (format!("WHERE {}", conditions.join(" AND ")), params)
}

fn as_refs(params: &[SqlParam]) -> Vec<&(dyn ToSql + Sync)> {
    params
        .iter()
        .map(|p| p.as_ref() as &(dyn ToSql + Sync))
        .collect()
}

/// Database service
pub struct DatabaseService {
    pool: DbPool,
}

impl DatabaseService {
    /// Create a new database service and verify connectivity
    pub async fn new(config: &DatabaseConfig) -> DbResult<Self> {
        let service = Self::from_config(config)?;

        // Test connection
        let client = service.get_client().await?;
        client.execute("SELECT 1", &[]).await?;

        log::info!("Database connection established");

        Ok(service)
    }

    /// Build the pool without opening a connection
    pub fn from_config(config: &DatabaseConfig) -> DbResult<Self> {
        let mut cfg = Config::new();
        cfg.url = Some(config.url.clone());
        cfg.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });

        let mut pool_cfg = PoolConfig::new(config.max_connections.max(1) as usize);
        pool_cfg.timeouts.wait = Some(Duration::from_secs(config.wait_timeout_seconds));
        pool_cfg.timeouts.create = Some(Duration::from_secs(config.connect_timeout_seconds));
        cfg.pool = Some(pool_cfg);

        let pool = cfg.create_pool(Some(Runtime::Tokio1), NoTls)?;
        Ok(Self { pool })
    }

    /// Get a database client from the pool
    pub async fn get_client(&self) -> DbResult<deadpool_postgres::Client> {
        Ok(self.pool.get().await?)
    }

    /// Initialize database schema
    pub async fn init_schema(&self) -> DbResult<()> {
        let client = self.get_client().await?;
        client.batch_execute(INITIAL_SCHEMA).await?;
        log::info!("Database schema initialized");
        Ok(())
    }

    /// Insert an error log record
    pub async fn insert_error_log(
        &self,
        severity: &str,
        category: &str,
        message: &str,
        details: Option<serde_json::Value>,
    ) -> DbResult<Uuid> {
        let client = self.get_client().await?;

        let id = Uuid::new_v4();
        client
            .execute(
                "INSERT INTO error_logs (id, severity, category, message, details) VALUES ($1, $2, $3, $4, $5)",
                &[&id, &severity, &category, &message, &details],
            )
            .await?;

        Ok(id)
    }

    // ---- orders ----

    pub async fn count_orders(&self) -> DbResult<i64> {
        let client = self.get_client().await?;
        let row = client.query_one("SELECT COUNT(*) FROM orders", &[]).await?;
        Ok(row.get(0))
    }

    /// Most recently created orders
    pub async fn recent_orders(&self, limit: i64) -> DbResult<Vec<Order>> {
        let client = self.get_client().await?;
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC LIMIT $1");
        let rows = client.query(sql.as_str(), &[&limit]).await?;
        Ok(rows.iter().map(Self::row_to_order).collect())
    }

    pub async fn get_order(&self, order_id: &Uuid) -> DbResult<Option<Order>> {
        let client = self.get_client().await?;
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1");
        let row = client.query_opt(sql.as_str(), &[order_id]).await?;
        Ok(row.as_ref().map(Self::row_to_order))
    }

    pub async fn orders_by_driver(&self, driver_id: &Uuid, limit: i64, offset: i64) -> DbResult<Vec<Order>> {
        let client = self.get_client().await?;
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE driver_id = $1 ORDER BY created_at DESC LIMIT $2 OFFSET $3"
        );
        let rows = client.query(sql.as_str(), &[driver_id, &limit, &offset]).await?;
        Ok(rows.iter().map(Self::row_to_order).collect())
    }

    pub async fn count_orders_by_driver(&self, driver_id: &Uuid) -> DbResult<i64> {
        let client = self.get_client().await?;
        let row = client
            .query_one("SELECT COUNT(*) FROM orders WHERE driver_id = $1", &[driver_id])
            .await?;
        Ok(row.get(0))
    }

    // ---- drivers ----

    pub async fn get_driver(&self, driver_id: &Uuid) -> DbResult<Option<Driver>> {
        let client = self.get_client().await?;
        let sql = format!("SELECT {DRIVER_COLUMNS} FROM drivers WHERE id = $1");
        let row = client.query_opt(sql.as_str(), &[driver_id]).await?;
        Ok(row.as_ref().map(Self::row_to_driver))
    }

    /// Oldest registered driver, if any
    pub async fn first_driver(&self) -> DbResult<Option<Driver>> {
        let client = self.get_client().await?;
        let sql = format!("SELECT {DRIVER_COLUMNS} FROM drivers ORDER BY created_at ASC LIMIT 1");
        let row = client.query_opt(sql.as_str(), &[]).await?;
        Ok(row.as_ref().map(Self::row_to_driver))
    }

    // ---- users ----

    pub async fn get_user(&self, user_id: &Uuid) -> DbResult<Option<User>> {
        let client = self.get_client().await?;
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row = client.query_opt(sql.as_str(), &[user_id]).await?;
        Ok(row.as_ref().map(Self::row_to_user))
    }

    /// Users, optionally restricted to one role and a name/email search
    pub async fn users_by_role(
        &self,
        role: Option<UserRole>,
        search: Option<&str>,
        order: SortOrder,
        limit: i64,
        offset: i64,
    ) -> DbResult<Vec<User>> {
        let client = self.get_client().await?;
        let role = role.map(|r| r.as_str());
        let pattern = search.map(like_pattern);
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users \
             WHERE ($1::VARCHAR IS NULL OR role = $1) \
             AND ($2::VARCHAR IS NULL OR name ILIKE $2 OR email ILIKE $2) \
             ORDER BY created_at {}, id LIMIT $3 OFFSET $4",
            order.as_sql()
        );
        let rows = client
            .query(sql.as_str(), &[&role, &pattern, &limit, &offset])
            .await?;
        Ok(rows.iter().map(Self::row_to_user).collect())
    }

    pub async fn count_users(&self, role: Option<UserRole>, search: Option<&str>) -> DbResult<i64> {
        let client = self.get_client().await?;
        let role = role.map(|r| r.as_str());
        let pattern = search.map(like_pattern);
        let row = client
            .query_one(
                "SELECT COUNT(*) FROM users WHERE ($1::VARCHAR IS NULL OR role = $1) \
                 AND ($2::VARCHAR IS NULL OR name ILIKE $2 OR email ILIKE $2)",
                &[&role, &pattern],
            )
            .await?;
        Ok(row.get(0))
    }

    pub async fn user_counts_by_role(&self) -> DbResult<Vec<RoleCount>> {
        let client = self.get_client().await?;
        let rows = client
            .query("SELECT role, COUNT(*) FROM users GROUP BY role ORDER BY role", &[])
            .await?;
        Ok(rows
            .iter()
            .map(|row| RoleCount {
                role: UserRole::from_db(row.get::<_, &str>(0)),
                count: row.get(1),
            })
            .collect())
    }

    // ---- vendor types ----

    pub async fn list_vendor_types(&self, active_only: bool) -> DbResult<Vec<VendorType>> {
        let client = self.get_client().await?;
        let sql = format!(
            "SELECT {VENDOR_TYPE_COLUMNS} FROM vendor_types WHERE ($1 = false OR is_active = true) ORDER BY name"
        );
        let rows = client.query(sql.as_str(), &[&active_only]).await?;
        Ok(rows.iter().map(Self::row_to_vendor_type).collect())
    }

    /// Insert the given vendor types, skipping slugs that already exist.
    /// Returns the number of rows inserted.
    pub async fn seed_vendor_types(&self, seeds: &[VendorTypeSeed]) -> DbResult<u64> {
        let mut client = self.get_client().await?;
        let txn = client.transaction().await?;

        let mut inserted = 0;
        for seed in seeds {
            inserted += txn
                .execute(
                    "INSERT INTO vendor_types (name, slug, description) VALUES ($1, $2, $3) \
                     ON CONFLICT (slug) DO NOTHING",
                    &[&seed.name, &seed.slug, &seed.description],
                )
                .await?;
        }

        txn.commit().await?;
        Ok(inserted)
    }

    // ---- vendors ----

    pub async fn get_vendor(&self, vendor_id: &Uuid) -> DbResult<Option<Vendor>> {
        let client = self.get_client().await?;
        let sql = format!("SELECT {VENDOR_COLUMNS} FROM vendors WHERE id = $1");
        let row = client.query_opt(sql.as_str(), &[vendor_id]).await?;
        Ok(row.as_ref().map(Self::row_to_vendor))
    }

    /// Record a review decision and, when it was the last outstanding
    /// document of a pending vendor, activate the vendor. The vendor row is
    /// locked for the whole transaction so concurrent reviews serialize.
    pub async fn review_vendor_document(
        &self,
        vendor_id: &Uuid,
        document_id: &Uuid,
        review: &VendorDocumentVerificationRequest,
    ) -> DbResult<DocumentReview> {
        let mut client = self.get_client().await?;
        let txn = client.transaction().await?;

        let vendor = txn
            .query_opt("SELECT status FROM vendors WHERE id = $1 FOR UPDATE", &[vendor_id])
            .await?;
        let mut vendor_status = match vendor {
            Some(row) => VendorStatus::from_db(row.get::<_, &str>(0)),
            None => return Ok(DocumentReview::VendorNotFound),
        };

        // An approval clears any reason left over from an earlier rejection.
        let rejection_reason = match review.status {
            DocumentStatus::Rejected => review.rejection_reason.as_deref(),
            _ => None,
        };
        let sql = format!(
            "UPDATE vendor_documents \
             SET status = $3, rejection_reason = $4, notes = $5, expires_at = COALESCE($6, expires_at), reviewed_at = NOW() \
             WHERE id = $1 AND vendor_id = $2 RETURNING {DOCUMENT_COLUMNS}"
        );
        let row = txn
            .query_opt(
                sql.as_str(),
                &[
                    document_id,
                    vendor_id,
                    &review.status.as_str(),
                    &rejection_reason,
                    &review.notes,
                    &review.expires_at,
                ],
            )
            .await?;
        let document = match row {
            Some(row) => Self::row_to_document(&row),
            None => return Ok(DocumentReview::DocumentNotFound),
        };

        let mut activated = false;
        if vendor_status == VendorStatus::Pending && review.status == DocumentStatus::Approved {
            let outstanding: i64 = txn
                .query_one(
                    "SELECT COUNT(*) FROM vendor_documents WHERE vendor_id = $1 AND status <> 'approved'",
                    &[vendor_id],
                )
                .await?
                .get(0);
            if outstanding == 0 {
                txn.execute(
                    "UPDATE vendors SET status = $2, updated_at = NOW() WHERE id = $1",
                    &[vendor_id, &VendorStatus::Active.as_str()],
                )
                .await?;
                vendor_status = VendorStatus::Active;
                activated = true;
            }
        }

        txn.commit().await?;
        Ok(DocumentReview::Reviewed {
            document,
            vendor_status,
            activated,
        })
    }

    // ---- products ----

    pub async fn list_products(&self, filter: &ProductFilterQuery, limit: i64, offset: i64) -> DbResult<Vec<Product>> {
        let client = self.get_client().await?;
        let (where_clause, mut params) = build_product_filter(filter);
        params.push(Box::new(limit));
        let limit_idx = params.len();
        params.push(Box::new(offset));
        let offset_idx = params.len();

        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products p JOIN vendors v ON v.id = p.vendor_id {where_clause} \
             ORDER BY p.{} {}, p.id LIMIT ${limit_idx} OFFSET ${offset_idx}",
            filter.sort_field().column(),
            filter.order().as_sql(),
        );
        let rows = client.query(sql.as_str(), &as_refs(&params)).await?;
        Ok(rows.iter().map(Self::row_to_product).collect())
    }

    pub async fn count_products(&self, filter: &ProductFilterQuery) -> DbResult<i64> {
        let client = self.get_client().await?;
        let (where_clause, params) = build_product_filter(filter);
        let sql = format!("SELECT COUNT(*) FROM products p JOIN vendors v ON v.id = p.vendor_id {where_clause}");
        let row = client.query_one(sql.as_str(), &as_refs(&params)).await?;
        Ok(row.get(0))
    }

    // ---- payments ----

    pub async fn create_wallet_transaction(
        &self,
        user_id: &Uuid,
        payment: &PaymentRequest,
        transaction_type: TransactionType,
        status: &str,
    ) -> DbResult<WalletTransaction> {
        let client = self.get_client().await?;
        let sql = format!(
            "INSERT INTO wallet_transactions \
             (user_id, order_id, amount, currency, transaction_type, payment_method, gateway, gateway_reference, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {TRANSACTION_COLUMNS}"
        );
        let row = client
            .query_one(
                sql.as_str(),
                &[
                    user_id,
                    &payment.order_id,
                    &payment.amount,
                    &payment.currency_or_default(),
                    &transaction_type.as_str(),
                    &payment.method.as_str(),
                    &payment.gateway.as_str(),
                    &payment.gateway_reference,
                    &status,
                ],
            )
            .await?;
        Ok(Self::row_to_transaction(&row))
    }

    pub async fn wallet_transactions(&self, user_id: &Uuid, limit: i64, offset: i64) -> DbResult<Vec<WalletTransaction>> {
        let client = self.get_client().await?;
        let sql = format!(
            "SELECT {TRANSACTION_COLUMNS} FROM wallet_transactions WHERE user_id = $1 \
             ORDER BY created_at DESC LIMIT $2 OFFSET $3"
        );
        let rows = client.query(sql.as_str(), &[user_id, &limit, &offset]).await?;
        Ok(rows.iter().map(Self::row_to_transaction).collect())
    }

    pub async fn count_wallet_transactions(&self, user_id: &Uuid) -> DbResult<i64> {
        let client = self.get_client().await?;
        let row = client
            .query_one("SELECT COUNT(*) FROM wallet_transactions WHERE user_id = $1", &[user_id])
            .await?;
        Ok(row.get(0))
    }

    // ---- addresses ----

    /// Store an address; a new default address replaces the previous default
    pub async fn create_address(&self, user_id: &Uuid, address: &AddressRequest) -> DbResult<Address> {
        let mut client = self.get_client().await?;
        let txn = client.transaction().await?;

        let is_default = address.is_default.unwrap_or(false);
        if is_default {
            txn.execute(
                "UPDATE addresses SET is_default = false WHERE user_id = $1 AND is_default = true",
                &[user_id],
            )
            .await?;
        }

        let sql = format!(
            "INSERT INTO addresses \
             (user_id, label, street, city, state, postal_code, country, latitude, longitude, \
              floor, apartment, landmark, instructions, is_default) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) \
             RETURNING {ADDRESS_COLUMNS}"
        );
        let row = txn
            .query_one(
                sql.as_str(),
                &[
                    user_id,
                    &address.label,
                    &address.street,
                    &address.city,
                    &address.state,
                    &address.postal_code,
                    &address.country,
                    &address.latitude,
                    &address.longitude,
                    &address.floor,
                    &address.apartment,
                    &address.landmark,
                    &address.instructions,
                    &is_default,
                ],
            )
            .await?;

        txn.commit().await?;
        Ok(Self::row_to_address(&row))
    }

    pub async fn list_addresses(&self, user_id: &Uuid) -> DbResult<Vec<Address>> {
        let client = self.get_client().await?;
        let sql = format!(
            "SELECT {ADDRESS_COLUMNS} FROM addresses WHERE user_id = $1 ORDER BY is_default DESC, created_at DESC"
        );
        let rows = client.query(sql.as_str(), &[user_id]).await?;
        Ok(rows.iter().map(Self::row_to_address).collect())
    }

    // ---- support ----

    /// Store a reply, touch the ticket and optionally close it, all in one
    /// transaction with the ticket row locked.
    pub async fn create_support_reply(
        &self,
        ticket_id: &Uuid,
        reply: &SupportReplyRequest,
        close_ticket: bool,
    ) -> DbResult<SupportReplyOutcome> {
        let mut client = self.get_client().await?;
        let txn = client.transaction().await?;

        let ticket = txn
            .query_opt("SELECT status FROM support_tickets WHERE id = $1 FOR UPDATE", &[ticket_id])
            .await?;
        match ticket {
            None => return Ok(SupportReplyOutcome::TicketNotFound),
            Some(row) if row.get::<_, &str>(0) == "closed" => return Ok(SupportReplyOutcome::TicketClosed),
            Some(_) => {}
        }

        let attachments = reply.attachments.clone().unwrap_or_default();
        let is_internal = reply.is_internal.unwrap_or(false);
        let sql = format!(
            "INSERT INTO support_replies (ticket_id, message, attachments, is_internal) \
             VALUES ($1, $2, $3, $4) RETURNING {REPLY_COLUMNS}"
        );
        let row = txn
            .query_one(sql.as_str(), &[ticket_id, &reply.message, &attachments, &is_internal])
            .await?;

        let status_sql = if close_ticket {
            "UPDATE support_tickets SET status = 'closed', updated_at = NOW() WHERE id = $1"
        } else {
            "UPDATE support_tickets SET updated_at = NOW() WHERE id = $1"
        };
        txn.execute(status_sql, &[ticket_id]).await?;

        txn.commit().await?;
        Ok(SupportReplyOutcome::Created(Self::row_to_reply(&row)))
    }

    // ---- row mapping ----

    fn row_to_user(row: &tokio_postgres::Row) -> User {
        User {
            id: row.get(0),
            name: row.get(1),
            email: row.get(2),
            phone: row.get(3),
            role: UserRole::from_db(row.get::<_, &str>(4)),
            is_active: row.get(5),
            created_at: row.get(6),
        }
    }

    fn row_to_driver(row: &tokio_postgres::Row) -> Driver {
        Driver {
            id: row.get(0),
            user_id: row.get(1),
            vehicle_type: row.get(2),
            license_plate: row.get(3),
            is_available: row.get(4),
            current_latitude: row.get(5),
            current_longitude: row.get(6),
            rating: row.get(7),
            created_at: row.get(8),
        }
    }

    fn row_to_vendor_type(row: &tokio_postgres::Row) -> VendorType {
        VendorType {
            id: row.get(0),
            name: row.get(1),
            slug: row.get(2),
            description: row.get(3),
            is_active: row.get(4),
            created_at: row.get(5),
        }
    }

    fn row_to_vendor(row: &tokio_postgres::Row) -> Vendor {
        Vendor {
            id: row.get(0),
            user_id: row.get(1),
            vendor_type_id: row.get(2),
            business_name: row.get(3),
            status: VendorStatus::from_db(row.get::<_, &str>(4)),
            commission_rate: row.get(5),
            delivery_radius_km: row.get(6),
            min_order_amount: row.get(7),
            preparation_time_minutes: row.get(8),
            rating: row.get(9),
            created_at: row.get(10),
            updated_at: row.get(11),
        }
    }

    fn row_to_document(row: &tokio_postgres::Row) -> VendorDocument {
        VendorDocument {
            id: row.get(0),
            vendor_id: row.get(1),
            document_type: row.get(2),
            file_url: row.get(3),
            status: DocumentStatus::from_db(row.get::<_, &str>(4)),
            rejection_reason: row.get(5),
            notes: row.get(6),
            reviewed_at: row.get(7),
            expires_at: row.get(8),
            created_at: row.get(9),
        }
    }

    fn row_to_product(row: &tokio_postgres::Row) -> Product {
        Product {
            id: row.get(0),
            vendor_id: row.get(1),
            name: row.get(2),
            description: row.get(3),
            price: row.get(4),
            is_available: row.get(5),
            is_vegetarian: row.get(6),
            rating: row.get(7),
            created_at: row.get(8),
        }
    }

    fn row_to_order(row: &tokio_postgres::Row) -> Order {
        Order {
            id: row.get(0),
            order_number: row.get(1),
            customer_id: row.get(2),
            vendor_id: row.get(3),
            driver_id: row.get(4),
            status: OrderStatus::from_db(row.get::<_, &str>(5)),
            total_amount: row.get(6),
            payment_method: row.get::<_, Option<&str>>(7).and_then(PaymentMethod::from_tag),
            created_at: row.get(8),
            updated_at: row.get(9),
        }
    }

    fn row_to_transaction(row: &tokio_postgres::Row) -> WalletTransaction {
        WalletTransaction {
            id: row.get(0),
            user_id: row.get(1),
            order_id: row.get(2),
            amount: row.get(3),
            currency: row.get(4),
            transaction_type: TransactionType::from_db(row.get::<_, &str>(5)),
            payment_method: PaymentMethod::from_tag(row.get::<_, &str>(6)).unwrap_or(PaymentMethod::Cash),
            gateway: PaymentGateway::from_db(row.get::<_, &str>(7)),
            gateway_reference: row.get(8),
            status: row.get(9),
            created_at: row.get(10),
        }
    }

    fn row_to_address(row: &tokio_postgres::Row) -> Address {
        Address {
            id: row.get(0),
            user_id: row.get(1),
            label: row.get(2),
            street: row.get(3),
            city: row.get(4),
            state: row.get(5),
            postal_code: row.get(6),
            country: row.get(7),
            latitude: row.get(8),
            longitude: row.get(9),
            floor: row.get(10),
            apartment: row.get(11),
            landmark: row.get(12),
            instructions: row.get(13),
            is_default: row.get(14),
            created_at: row.get(15),
        }
    }

    fn row_to_reply(row: &tokio_postgres::Row) -> SupportReply {
        SupportReply {
            id: row.get(0),
            ticket_id: row.get(1),
            message: row.get(2),
            attachments: row.get(3),
            is_internal: row.get(4),
            created_at: row.get(5),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("pizza"), "%pizza%");
    }

    #[test]
    fn empty_filter_only_restricts_to_active_vendors() {
        let (clause, params) = build_product_filter(&ProductFilterQuery::default());
        assert_eq!(clause, "WHERE v.status = 'active'");
        assert!(params.is_empty());
    }

    #[test]
    fn filter_numbers_placeholders_in_order() {
        let filter = ProductFilterQuery {
            search: Some("curry".to_string()),
            min_price: Some(5.0),
            max_price: Some(15.0),
            is_vegetarian: Some(true),
            ..Default::default()
        };
        let (clause, params) = build_product_filter(&filter);
        assert_eq!(
            clause,
            "WHERE v.status = 'active' AND (p.name ILIKE $1 OR p.description ILIKE $1) \
             AND p.price >= $2 AND p.price <= $3 AND p.is_vegetarian = $4"
        );
        assert_eq!(params.len(), 4);
    }

    #[test]
    fn filter_by_vendor_and_type() {
        let filter = ProductFilterQuery {
            vendor_id: Some(Uuid::nil()),
            vendor_type_id: Some(Uuid::nil()),
            is_available: Some(false),
            ..Default::default()
        };
        let (clause, params) = build_product_filter(&filter);
        assert!(clause.contains("p.vendor_id = $1"));
        assert!(clause.contains("v.vendor_type_id = $2"));
        assert!(clause.contains("p.is_available = $3"));
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn schema_defaults_follow_vendor_defaults() {
        use crate::constants::vendor_defaults::*;
        assert!(INITIAL_SCHEMA.contains(&format!(
            "commission_rate DOUBLE PRECISION NOT NULL DEFAULT {:.1}",
            COMMISSION_RATE_PERCENT
        )));
        assert!(INITIAL_SCHEMA.contains(&format!(
            "delivery_radius_km DOUBLE PRECISION NOT NULL DEFAULT {:.1}",
            DELIVERY_RADIUS_KM
        )));
        assert!(INITIAL_SCHEMA.contains(&format!(
            "preparation_time_minutes INTEGER NOT NULL DEFAULT {}",
            PREPARATION_TIME_MINUTES
        )));
        assert_eq!(MIN_ORDER_AMOUNT, 0.0);
        assert_eq!(STARTING_RATING, 0.0);
    }

    #[test]
    fn from_config_does_not_connect() {
        let config = DatabaseConfig {
            url: "postgres://postgres@127.0.0.1:1/unreachable".to_string(),
            max_connections: 2,
            connect_timeout_seconds: 1,
            wait_timeout_seconds: 1,
        };
        assert!(DatabaseService::from_config(&config).is_ok());
    }
}
