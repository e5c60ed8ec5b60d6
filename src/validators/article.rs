use serde::Deserialize;

use super::ValidationErrors;

#[derive(Debug, Deserialize)]
pub struct CreateArticleRequest {
    pub article: CreateArticle,
}

#[derive(Debug, Deserialize)]
pub struct CreateArticle {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub body: String,
    #[serde(default, rename = "tagList")]
    pub tag_list: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateArticleRequest {
    pub article: UpdateArticle,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateArticle {
    pub title: Option<String>,
    pub description: Option<String>,
    pub body: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub comment: CreateComment,
}

#[derive(Debug, Deserialize)]
pub struct CreateComment {
    #[serde(default)]
    pub body: String,
}

/// Derive a URL-safe identifier from a title: lowercase the alphanumerics,
/// collapse everything else into single dashes.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;

    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            slug.push(c.to_ascii_lowercase());
            pending_dash = false;
        } else {
            pending_dash = true;
        }
    }

    slug
}

/// Validate a creation payload and derive its slug.
pub fn validate_create(req: &CreateArticle) -> Result<String, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if req.title.trim().is_empty() {
        errors.add("title", "can't be blank");
    } else if slugify(&req.title).is_empty() {
        errors.add("title", "must contain at least one letter or number");
    }

    if req.description.trim().is_empty() {
        errors.add("description", "can't be blank");
    }

    if req.body.trim().is_empty() {
        errors.add("body", "can't be blank");
    }

    errors.into_result()?;
    Ok(slugify(&req.title))
}

/// Validate an update payload. Returns the regenerated slug when the title
/// changes; absent fields leave the article untouched.
pub fn validate_update(req: &UpdateArticle) -> Result<Option<String>, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let mut new_slug = None;

    if let Some(title) = &req.title {
        if title.trim().is_empty() {
            errors.add("title", "can't be blank");
        } else if slugify(title).is_empty() {
            errors.add("title", "must contain at least one letter or number");
        } else {
            new_slug = Some(slugify(title));
        }
    }

    if let Some(description) = &req.description {
        if description.trim().is_empty() {
            errors.add("description", "can't be blank");
        }
    }

    if let Some(body) = &req.body {
        if body.trim().is_empty() {
            errors.add("body", "can't be blank");
        }
    }

    errors.into_result()?;
    Ok(new_slug)
}

pub fn validate_comment(req: &CreateComment) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if req.body.trim().is_empty() {
        errors.add("body", "can't be blank");
    }

    errors.into_result()
}
