//! Conversions from gateway wire types into the core's pure types.

use readpull_core::{ArticlePage, ArticleView, JobPhase, JobUpdate, PdfFailure};
use readpull_gateway::{ApiFailure, Article, ArticlesResponse, FailureKind, JobStatus};

pub(crate) fn job_update(status: JobStatus) -> JobUpdate {
    JobUpdate {
        phase: JobPhase::from_tag(&status.status),
        current_step: status.current_step,
        step_description: status.step_description,
        search_results_count: status.search_results_count,
        article_id: status.article_id,
        error_message: status.error_message,
    }
}

pub(crate) fn article_view(article: Article) -> ArticleView {
    ArticleView {
        id: article.id,
        url: article.url,
        title: article.title,
        html_content: article.html_content,
        pdf_path: article.pdf_path,
        site_source: article.site_source,
        created_at: article.created_at,
        scraped_at: article.scraped_at,
    }
}

pub(crate) fn article_page(response: ArticlesResponse) -> ArticlePage {
    ArticlePage {
        articles: response.articles.into_iter().map(article_view).collect(),
        total: response.total,
    }
}

/// An absent or empty PDF is "not generated yet"; everything else is generic.
pub(crate) fn pdf_failure(failure: ApiFailure) -> PdfFailure {
    match failure.kind {
        FailureKind::NotFound | FailureKind::EmptyBody => PdfFailure::NotGenerated,
        _ => PdfFailure::Other(failure.to_string()),
    }
}
