use paperclip::actix::Apiv2Schema;
use serde::{Deserialize, Serialize};

use bookshelf_library::api::Book;

#[derive(Debug, Default, Clone, Serialize, Deserialize, Eq, PartialEq, Apiv2Schema)]
/// Books recommended for user, none of them is on user shelves yet
pub struct Recommendations {
    /// Most relevant first
    pub books: Vec<Book>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, Apiv2Schema)]
pub struct RecommendationsQuery {
    /// Maximum number of recommended books, service default when absent
    pub n: Option<usize>,
}
