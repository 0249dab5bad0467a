//! Tantivy-based search index module.
//!
//! Ranked full-text search over document titles, tags, excerpts and bodies.
//! The feed's tag/query filter does not go through this index.

use std::path::Path;
use std::sync::Arc;
use tantivy::collector::TopDocs;
use tantivy::query::{BooleanQuery, BoostQuery, Occur, Query, QueryParser};
use tantivy::schema::{Field, Schema, Value, STORED, STRING, TEXT};
use tantivy::{doc, Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument, Term};
use tokio::sync::RwLock;

use crate::errors::AppError;
use crate::models::Document;

/// Field boost values.
const BOOST_TITLE: f32 = 10.0;
const BOOST_TAGS: f32 = 8.0;
const BOOST_EXCERPT: f32 = 6.0;
const BOOST_CONTENT: f32 = 3.0;

/// Search hit with relevance score.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub document_id: String,
    pub score: f32,
}

/// Search index schema fields.
struct SearchFields {
    document_id: Field,
    title: Field,
    excerpt: Field,
    content: Field,
    tags: Field,
}

/// Tantivy search index for documents.
pub struct SearchIndex {
    index: Index,
    reader: IndexReader,
    writer: Arc<RwLock<IndexWriter>>,
    fields: SearchFields,
}

impl SearchIndex {
    /// Create or open a search index at the specified path.
    pub fn open(index_path: &Path) -> Result<Self, AppError> {
        std::fs::create_dir_all(index_path)
            .map_err(|e| AppError::Search(format!("Failed to create index directory: {}", e)))?;

        let mut schema_builder = Schema::builder();
        let document_id = schema_builder.add_text_field("document_id", STRING | STORED);
        let title = schema_builder.add_text_field("title", TEXT | STORED);
        let excerpt = schema_builder.add_text_field("excerpt", TEXT);
        let content = schema_builder.add_text_field("content", TEXT);
        let tags = schema_builder.add_text_field("tags", TEXT);
        let schema = schema_builder.build();

        let fields = SearchFields {
            document_id,
            title,
            excerpt,
            content,
            tags,
        };

        // Try to open existing index or create new one
        let index = Index::open_in_dir(index_path)
            .or_else(|_| Index::create_in_dir(index_path, schema.clone()))
            .map_err(|e| AppError::Search(format!("Failed to open/create index: {}", e)))?;

        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::OnCommitWithDelay)
            .try_into()
            .map_err(|e| AppError::Search(format!("Failed to create reader: {}", e)))?;

        let writer = index
            .writer(50_000_000) // 50MB buffer
            .map_err(|e| AppError::Search(format!("Failed to create writer: {}", e)))?;

        Ok(Self {
            index,
            reader,
            writer: Arc::new(RwLock::new(writer)),
            fields,
        })
    }

    /// Rebuild the entire index from documents.
    pub async fn rebuild(&self, documents: &[Document]) -> Result<(), AppError> {
        let mut writer = self.writer.write().await;

        writer.delete_all_documents()?;
        for document in documents {
            writer.add_document(self.create_document(document))?;
        }
        writer.commit()?;

        self.reader.reload()?;

        tracing::info!(documents = documents.len(), "Search index rebuilt");
        Ok(())
    }

    /// Index (or re-index) a single document.
    pub async fn index_document(&self, document: &Document) -> Result<(), AppError> {
        let mut writer = self.writer.write().await;

        writer.delete_term(Term::from_field_text(self.fields.document_id, &document.id));
        writer.add_document(self.create_document(document))?;
        writer.commit()?;

        self.reader.reload()?;

        Ok(())
    }

    /// Remove a document from the index.
    pub async fn remove_document(&self, document_id: &str) -> Result<(), AppError> {
        let mut writer = self.writer.write().await;

        writer.delete_term(Term::from_field_text(self.fields.document_id, document_id));
        writer.commit()?;

        self.reader.reload()?;

        Ok(())
    }

    /// Search for documents matching the query.
    pub fn search(
        &self,
        query_str: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<SearchResult>, AppError> {
        if query_str.trim().is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let searcher = self.reader.searcher();

        // Nothing lies past the last document; also bounds the collector size
        let num_docs = usize::try_from(searcher.num_docs()).unwrap_or(usize::MAX);
        if offset >= num_docs {
            return Ok(Vec::new());
        }
        let limit = limit.min(num_docs);

        let field_queries = [
            (self.fields.title, BOOST_TITLE),
            (self.fields.tags, BOOST_TAGS),
            (self.fields.excerpt, BOOST_EXCERPT),
            (self.fields.content, BOOST_CONTENT),
        ];

        // Lenient parsing: stray operators in user input must not fail the search
        let subqueries: Vec<(Occur, Box<dyn Query>)> = field_queries
            .into_iter()
            .map(|(field, boost)| {
                let parser = QueryParser::for_index(&self.index, vec![field]);
                let (field_query, _errors) = parser.parse_query_lenient(query_str);
                let boosted: Box<dyn Query> = Box::new(BoostQuery::new(field_query, boost));
                (Occur::Should, boosted)
            })
            .collect();

        let combined_query = BooleanQuery::new(subqueries);

        let top_docs = searcher
            .search(&combined_query, &TopDocs::with_limit(limit.saturating_add(offset)))
            .map_err(|e| AppError::Search(format!("Search failed: {}", e)))?;

        let results: Vec<SearchResult> = top_docs
            .into_iter()
            .skip(offset)
            .take(limit)
            .filter_map(|(score, doc_address)| {
                let doc: TantivyDocument = searcher.doc(doc_address).ok()?;
                let document_id = doc.get_first(self.fields.document_id)?.as_str()?.to_string();
                Some(SearchResult { document_id, score })
            })
            .collect();

        Ok(results)
    }

    /// Create a Tantivy document from a stored document.
    fn create_document(&self, document: &Document) -> TantivyDocument {
        doc!(
            self.fields.document_id => document.id.clone(),
            self.fields.title => document.title.clone(),
            self.fields.excerpt => document.excerpt.clone().unwrap_or_default(),
            self.fields.content => document.content.clone(),
            self.fields.tags => document.tags.join(" ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_document(id: &str, title: &str, content: &str, tags: &[&str]) -> Document {
        Document {
            id: id.to_string(),
            title: title.to_string(),
            emoji: None,
            excerpt: None,
            content: content.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            created_at: "2024-01-01T00:00:00.000000Z".to_string(),
            updated_at: "2024-01-01T00:00:00.000000Z".to_string(),
            owner_id: "owner".to_string(),
            is_public: true,
        }
    }

    #[tokio::test]
    async fn test_search_matches_body_text() {
        let temp_dir = TempDir::new().unwrap();
        let index = SearchIndex::open(temp_dir.path()).unwrap();

        let documents = vec![
            create_test_document("1", "Color notes", "deep blue palette for dashboards", &[]),
            create_test_document("2", "Prompt chaining", "research then synthesis", &["AI"]),
        ];
        index.rebuild(&documents).await.unwrap();

        let results = index.search("palette", 10, 0).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].document_id, "1");

        let results = index.search("ai", 10, 0).unwrap();
        assert_eq!(results[0].document_id, "2");
    }

    #[tokio::test]
    async fn test_reindex_and_remove() {
        let temp_dir = TempDir::new().unwrap();
        let index = SearchIndex::open(temp_dir.path()).unwrap();

        let mut document = create_test_document("1", "Onboarding", "first day checklist", &[]);
        index.index_document(&document).await.unwrap();
        assert_eq!(index.search("checklist", 10, 0).unwrap().len(), 1);

        document.content = "welcome packet".to_string();
        index.index_document(&document).await.unwrap();
        assert!(index.search("checklist", 10, 0).unwrap().is_empty());
        assert_eq!(index.search("packet", 10, 0).unwrap().len(), 1);

        index.remove_document("1").await.unwrap();
        assert!(index.search("onboarding", 10, 0).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_empty_query() {
        let temp_dir = TempDir::new().unwrap();
        let index = SearchIndex::open(temp_dir.path()).unwrap();

        let results = index.search("   ", 10, 0).unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_search_offset_past_end() {
        let temp_dir = TempDir::new().unwrap();
        let index = SearchIndex::open(temp_dir.path()).unwrap();

        let documents = vec![
            create_test_document("1", "Palette one", "warm colors", &[]),
            create_test_document("2", "Palette two", "cold colors", &[]),
        ];
        index.rebuild(&documents).await.unwrap();

        assert_eq!(index.search("palette", 20, 1).unwrap().len(), 1);
        assert!(index.search("palette", 20, 2).unwrap().is_empty());
        assert!(index.search("palette", 20, usize::MAX).unwrap().is_empty());
        assert_eq!(index.search("palette", usize::MAX, 0).unwrap().len(), 2);
    }
}
