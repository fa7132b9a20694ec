use std::sync::Arc;

use shared::domain::FaqItem;
use validation::EmailValidator;

#[derive(Clone)]
pub struct AppState {
    pub validator: EmailValidator,
    pub faq_items: Arc<Vec<FaqItem>>,
    pub max_bulk_emails: usize,
}
