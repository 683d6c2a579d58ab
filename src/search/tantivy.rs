use std::collections::HashSet;

use tantivy::collector::TopDocs;
use tantivy::query::{BooleanQuery, BoostQuery, FuzzyTermQuery, Occur, Query, TermQuery};
use tantivy::schema::{
    Field, IndexRecordOption, STORED, STRING, Schema, TextFieldIndexing, TextOptions, Value,
};
use tantivy::tokenizer::{
    Language, LowerCaser, RemoveLongFilter, SimpleTokenizer, Stemmer, StopWordFilter,
    TextAnalyzer, TokenStream,
};
use tantivy::{Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument, Term, doc};

use super::index::{SearchError, SearchIndex};
use crate::model::types::{Product, ProductId};

/// Single writer thread; the tantivy floor is 15MB per thread.
const WRITER_HEAP_BYTES: usize = 20_000_000;

/// Extra weight on exact term hits so they outrank prefix-only hits.
const EXACT_MATCH_BOOST: f32 = 2.0;

/// Analyzer registered for `title` and `description`, used for queries too.
pub const PRODUCT_TOKENIZER: &str = "product_en";

/// Tokens longer than this are dropped, same limit as tantivy's default analyzer.
const MAX_TOKEN_LEN: usize = 40;

#[derive(Clone, Copy)]
pub struct Fields {
    pub id: Field,
    pub title: Field,
    pub description: Field,
}

/// Per-field score multipliers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldBoosts {
    pub title: f32,
    pub description: f32,
}

impl Default for FieldBoosts {
    fn default() -> Self {
        Self {
            title: 1.0,
            description: 1.0,
        }
    }
}

/// In-RAM tantivy index over product titles and descriptions.
pub struct TantivySearchIndex {
    index: Index,
    reader: IndexReader,
    fields: Fields,
    boosts: FieldBoosts,
    doc_count: usize,
}

impl TantivySearchIndex {
    /// Index every product once. The catalog is immutable, so the index is
    /// never written again.
    #[tracing::instrument(skip_all, fields(products = products.len()))]
    pub fn build(products: &[Product], boosts: FieldBoosts) -> Result<Self, SearchError> {
        let schema = build_schema();
        let fields = fields_from_schema(&schema)?;
        let index = Index::create_in_ram(schema);
        index
            .tokenizers()
            .register(PRODUCT_TOKENIZER, product_analyzer());

        let mut writer: IndexWriter = index.writer_with_num_threads(1, WRITER_HEAP_BYTES)?;
        for product in products {
            writer.add_document(doc!(
                fields.id => product.id.to_string(),
                fields.title => product.title.clone(),
                fields.description => product.description.clone(),
            ))?;
        }
        writer.commit()?;

        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()?;

        tracing::info!(docs = products.len(), "search index built");
        Ok(Self {
            index,
            reader,
            fields,
            boosts,
            doc_count: products.len(),
        })
    }

    pub fn doc_count(&self) -> usize {
        self.doc_count
    }

    /// Run `text` through the field's analyzer so query terms match indexed terms.
    fn analyze(&self, field: Field, text: &str) -> Result<Vec<Term>, SearchError> {
        let mut analyzer = self.index.tokenizer_for_field(field)?;
        let mut stream = analyzer.token_stream(text);
        let mut terms = Vec::new();
        stream.process(&mut |token| terms.push(Term::from_field_text(field, &token.text)));
        Ok(terms)
    }

    fn build_query(&self, text: &str) -> Result<Option<BooleanQuery>, SearchError> {
        let mut clauses: Vec<(Occur, Box<dyn Query>)> = Vec::new();
        let targets = [
            (self.fields.title, self.boosts.title),
            (self.fields.description, self.boosts.description),
        ];
        for (field, boost) in targets {
            for term in self.analyze(field, text)? {
                let exact = TermQuery::new(term.clone(), IndexRecordOption::WithFreqs);
                clauses.push((
                    Occur::Should,
                    Box::new(BoostQuery::new(Box::new(exact), boost * EXACT_MATCH_BOOST)),
                ));
                let expanded = FuzzyTermQuery::new_prefix(term, 0, false);
                clauses.push((
                    Occur::Should,
                    Box::new(BoostQuery::new(Box::new(expanded), boost)),
                ));
            }
        }
        if clauses.is_empty() {
            return Ok(None);
        }
        Ok(Some(BooleanQuery::new(clauses)))
    }
}

impl SearchIndex for TantivySearchIndex {
    fn search(&self, text: &str) -> Result<Vec<ProductId>, SearchError> {
        let Some(query) = self.build_query(text)? else {
            return Ok(Vec::new());
        };

        let searcher = self.reader.searcher();
        let top = searcher.search(&query, &TopDocs::with_limit(self.doc_count.max(1)))?;

        let mut seen = HashSet::with_capacity(top.len());
        let mut ids = Vec::with_capacity(top.len());
        for (_score, address) in top {
            let stored: TantivyDocument = searcher.doc(address)?;
            let Some(raw) = stored.get_first(self.fields.id).and_then(|v| v.as_str()) else {
                continue;
            };
            let id = ProductId::from(raw);
            if seen.insert(id.clone()) {
                ids.push(id);
            }
        }
        tracing::debug!(query = text, hits = ids.len(), "backend=tantivy search");
        Ok(ids)
    }
}

pub fn build_schema() -> Schema {
    let mut schema_builder = Schema::builder();
    schema_builder.add_text_field("id", STRING | STORED);
    let text = TextOptions::default().set_indexing_options(
        TextFieldIndexing::default()
            .set_tokenizer(PRODUCT_TOKENIZER)
            .set_index_option(IndexRecordOption::WithFreqsAndPositions),
    );
    schema_builder.add_text_field("title", text.clone());
    schema_builder.add_text_field("description", text);
    schema_builder.build()
}

/// Split on non-alphanumerics, lowercase, drop English stop words, stem.
///
/// Stemming runs before prefix expansion, so `phones` and `phone` meet on
/// the same term and a bare stop word never fans out into prefix matches.
pub fn product_analyzer() -> TextAnalyzer {
    let builder = TextAnalyzer::builder(SimpleTokenizer::default())
        .filter(RemoveLongFilter::limit(MAX_TOKEN_LEN))
        .filter(LowerCaser);
    match StopWordFilter::new(Language::English) {
        Some(stop_words) => builder
            .filter(stop_words)
            .filter(Stemmer::new(Language::English))
            .build(),
        None => builder.filter(Stemmer::new(Language::English)).build(),
    }
}

pub fn fields_from_schema(schema: &Schema) -> Result<Fields, SearchError> {
    let get = |name: &str| {
        schema
            .get_field(name)
            .map_err(|_| SearchError::Schema(name.to_string()))
    };
    Ok(Fields {
        id: get("id")?,
        title: get("title")?,
        description: get("description")?,
    })
}
