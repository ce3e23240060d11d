use crate::models::Article;

pub struct ArticleController;

impl ArticleController {
    /// Show one article.
    ///
    /// Drafts are only visible to their author.
    ///
    /// @param u64 $id Article identifier
    /// @return Article The article
    /// @throws ArticleNotFound
    /// @throws Forbidden Caller may not read this draft
    pub fn show(&self, id: u64) -> Option<Article> {
        None
    }

    /// Create an article.
    /// @param string $title Headline of the new article
    /// @return Article
    /// @throws ValidationFailed
    pub fn create(&self) {}

    /// List articles.
    /// @param int $page
    /// @deprecated Use search instead
    pub fn list(&self) {}
}

pub fn health() {}
