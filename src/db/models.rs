/// Row of the `documents` table. `body` is the JSON document as text.
#[derive(Debug, sqlx::FromRow)]
pub struct DocumentRow {
    pub doc_key: String,
    pub body: String,
}
