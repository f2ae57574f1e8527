use std::sync::Arc;
use uuid::Uuid;

use crate::constants::{
    vendor_messages, DocumentStatus, OrderStatus, TransactionType, UserRole,
};
use crate::database::{DatabaseService, DocumentReview, SupportReplyOutcome};
use crate::dto::{
    AddressRequest, PaginationQuery, PaymentRequest, ProductFilterQuery, SupportReplyRequest,
    UserListQuery, VendorDocumentVerificationRequest,
};
use crate::models::{
    Address, DocumentReviewResponse, Order, PaginatedResponse, Product, SupportReply, User,
    VendorStatusResponse, VendorType, WalletTransaction,
};
use crate::utils::error::AppError;

pub type ServiceResult<T> = Result<T, AppError>;

fn paginated<T>(data: Vec<T>, page: &PaginationQuery, total: i64) -> PaginatedResponse<T> {
    PaginatedResponse::new(data, page.page(), page.limit() as u32, total.max(0) as u64)
}

/// Delivery addresses
pub struct AddressService {
    pub db: Arc<DatabaseService>,
}

impl AddressService {
    pub fn new(db: Arc<DatabaseService>) -> Self {
        Self { db }
    }

    pub async fn add_address(&self, user_id: Uuid, req: AddressRequest) -> ServiceResult<Address> {
        self.require_user(&user_id).await?;
        let address = self.db.create_address(&user_id, &req).await?;
        log::info!("Address {} added for user {}", address.id, user_id);
        Ok(address)
    }

    pub async fn list_addresses(&self, user_id: Uuid) -> ServiceResult<Vec<Address>> {
        self.require_user(&user_id).await?;
        Ok(self.db.list_addresses(&user_id).await?)
    }

    async fn require_user(&self, user_id: &Uuid) -> ServiceResult<User> {
        self.db
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))
    }
}

/// Payments recorded as wallet transactions
pub struct PaymentService {
    pub db: Arc<DatabaseService>,
    default_currency: String,
}

impl PaymentService {
    pub fn new(db: Arc<DatabaseService>, default_currency: impl Into<String>) -> Self {
        Self {
            db,
            default_currency: default_currency.into(),
        }
    }

    /// Record a payment made by `user_id`.
    ///
    /// A referenced order must exist, belong to the payer, and not be
    /// cancelled. Internal methods settle immediately; gateway payments stay
    /// pending until the gateway confirms them.
    pub async fn create_payment(&self, user_id: Uuid, mut req: PaymentRequest) -> ServiceResult<WalletTransaction> {
        if req.currency.is_none() {
            req.currency = Some(self.default_currency.clone());
        }

        let user = self
            .db
            .get_user(&user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;
        if !user.is_active {
            return Err(AppError::forbidden("Account is deactivated"));
        }

        if let Some(order_id) = req.order_id {
            let order = self
                .db
                .get_order(&order_id)
                .await?
                .ok_or_else(|| AppError::not_found("Order not found"))?;
            if order.customer_id != user_id {
                return Err(AppError::forbidden("Order does not belong to this user"));
            }
            if order.status == OrderStatus::Cancelled {
                return Err(AppError::conflict("Cannot pay for a cancelled order"));
            }
        }

        let status = if req.method.is_internal() { "completed" } else { "pending" };
        let txn = self
            .db
            .create_wallet_transaction(&user_id, &req, TransactionType::Debit, status)
            .await?;
        log::info!(
            "Recorded {} payment {} of {:.2} {} for user {}",
            req.method.as_str(),
            txn.id,
            txn.amount,
            txn.currency,
            user_id
        );
        Ok(txn)
    }

    pub async fn list_transactions(
        &self,
        user_id: Uuid,
        page: &PaginationQuery,
    ) -> ServiceResult<PaginatedResponse<WalletTransaction>> {
        let items = self
            .db
            .wallet_transactions(&user_id, page.limit(), page.offset())
            .await?;
        let total = self.db.count_wallet_transactions(&user_id).await?;
        Ok(paginated(items, page, total))
    }
}

/// Products and vendor types
pub struct CatalogService {
    pub db: Arc<DatabaseService>,
}

impl CatalogService {
    pub fn new(db: Arc<DatabaseService>) -> Self {
        Self { db }
    }

    pub async fn search_products(&self, filter: &ProductFilterQuery) -> ServiceResult<PaginatedResponse<Product>> {
        let page = filter.pagination();
        let items = self
            .db
            .list_products(filter, page.limit(), page.offset())
            .await?;
        let total = self.db.count_products(filter).await?;
        Ok(paginated(items, &page, total))
    }

    pub async fn vendor_types(&self) -> ServiceResult<Vec<VendorType>> {
        Ok(self.db.list_vendor_types(true).await?)
    }
}

/// Vendor onboarding and document review
pub struct VendorService {
    pub db: Arc<DatabaseService>,
}

impl VendorService {
    pub fn new(db: Arc<DatabaseService>) -> Self {
        Self { db }
    }

    pub async fn vendor_status(&self, vendor_id: Uuid) -> ServiceResult<VendorStatusResponse> {
        let vendor = self
            .db
            .get_vendor(&vendor_id)
            .await?
            .ok_or_else(|| AppError::not_found(vendor_messages::NOT_FOUND))?;
        Ok(VendorStatusResponse {
            vendor_id,
            status: vendor.status,
            message: vendor.status.message().to_string(),
        })
    }

    /// Apply an admin decision to one document and recompute the vendor status.
    ///
    /// A pending vendor is activated once none of its documents is left
    /// unapproved. Suspended and rejected vendors are never changed here.
    pub async fn review_document(
        &self,
        vendor_id: Uuid,
        document_id: Uuid,
        req: VendorDocumentVerificationRequest,
    ) -> ServiceResult<DocumentReviewResponse> {
        let (document, vendor_status) =
            match self.db.review_vendor_document(&vendor_id, &document_id, &req).await? {
                DocumentReview::Reviewed {
                    document,
                    vendor_status,
                    activated,
                } => {
                    if activated {
                        log::info!("Vendor {} activated after document review", vendor_id);
                    }
                    (document, vendor_status)
                }
                DocumentReview::VendorNotFound => {
                    return Err(AppError::not_found(vendor_messages::NOT_FOUND))
                }
                DocumentReview::DocumentNotFound => {
                    return Err(AppError::not_found("Document not found"))
                }
            };
        let message = match req.status {
            DocumentStatus::Rejected => vendor_messages::DOCUMENT_REJECTED,
            _ => vendor_messages::DOCUMENT_APPROVED,
        };
        Ok(DocumentReviewResponse {
            document,
            vendor_status,
            message: message.to_string(),
        })
    }
}

/// Support ticket replies
pub struct SupportService {
    pub db: Arc<DatabaseService>,
}

impl SupportService {
    pub fn new(db: Arc<DatabaseService>) -> Self {
        Self { db }
    }

    pub async fn reply(&self, ticket_id: Uuid, req: SupportReplyRequest) -> ServiceResult<SupportReply> {
        let close = req.close_ticket.unwrap_or(false);
        match self.db.create_support_reply(&ticket_id, &req, close).await? {
            SupportReplyOutcome::Created(reply) => {
                if close {
                    log::info!("Support ticket {} closed with reply {}", ticket_id, reply.id);
                }
                Ok(reply)
            }
            SupportReplyOutcome::TicketNotFound => Err(AppError::not_found("Support ticket not found")),
            SupportReplyOutcome::TicketClosed => Err(AppError::conflict("Support ticket is closed")),
        }
    }
}

/// Order lookups
pub struct OrderService {
    pub db: Arc<DatabaseService>,
}

impl OrderService {
    pub fn new(db: Arc<DatabaseService>) -> Self {
        Self { db }
    }

    pub async fn orders_for_driver(
        &self,
        driver_id: Uuid,
        page: &PaginationQuery,
    ) -> ServiceResult<PaginatedResponse<Order>> {
        if self.db.get_driver(&driver_id).await?.is_none() {
            return Err(AppError::not_found("Driver not found"));
        }
        let items = self
            .db
            .orders_by_driver(&driver_id, page.limit(), page.offset())
            .await?;
        let total = self.db.count_orders_by_driver(&driver_id).await?;
        Ok(paginated(items, page, total))
    }
}

/// User listings for the admin console
pub struct UserService {
    pub db: Arc<DatabaseService>,
}

impl UserService {
    pub fn new(db: Arc<DatabaseService>) -> Self {
        Self { db }
    }

    pub async fn list_users(&self, query: &UserListQuery) -> ServiceResult<PaginatedResponse<User>> {
        let page = query.pagination();
        let role: Option<UserRole> = query.role;
        let search = page.search.as_deref();
        let order = page.sort_order.unwrap_or_default();
        let items = self
            .db
            .users_by_role(role, search, order, page.limit(), page.offset())
            .await?;
        let total = self.db.count_users(role, search).await?;
        Ok(paginated(items, &page, total))
    }
}
