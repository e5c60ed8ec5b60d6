mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn comment_flow() -> Result<()> {
    let app = common::test_app().await?;
    let author = common::register_ok(&app, "jake", "jake@example.com").await?;
    let slug = common::create_article_ok(&app, &author, "Discussed Article", &[]).await?;

    let commenter = common::register_ok(&app, "anna", "anna@example.com").await?;
    let (status, body) = common::request(
        &app,
        "POST",
        &format!("/api/articles/{}/comments", slug),
        Some(&commenter),
        Some(json!({"comment": {"body": "Great writeup!"}})),
    )
    .await?;

    assert_eq!(status, StatusCode::CREATED, "body: {}", body);
    assert_eq!(body["comment"]["body"], "Great writeup!");
    assert_eq!(body["comment"]["author"]["username"], "anna");
    assert!(body["comment"]["id"].is_i64());
    assert!(body["comment"]["createdAt"].is_string());
    Ok(())
}

#[tokio::test]
async fn comments_list_in_insertion_order() -> Result<()> {
    let app = common::test_app().await?;
    let author = common::register_ok(&app, "jake", "jake@example.com").await?;
    let slug = common::create_article_ok(&app, &author, "Busy Thread", &[]).await?;

    for text in ["first", "second", "third"] {
        common::request(
            &app,
            "POST",
            &format!("/api/articles/{}/comments", slug),
            Some(&author),
            Some(json!({"comment": {"body": text}})),
        )
        .await?;
    }

    // Anonymous read
    let (status, body) = common::request(
        &app,
        "GET",
        &format!("/api/articles/{}/comments", slug),
        None,
        None,
    )
    .await?;

    assert_eq!(status, StatusCode::OK);
    let bodies: Vec<&str> = body["comments"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["body"].as_str().unwrap())
        .collect();
    assert_eq!(bodies, vec!["first", "second", "third"]);
    assert_eq!(body["comments"][0]["author"]["following"], false);
    Ok(())
}

#[tokio::test]
async fn comment_author_follow_flag_tracks_viewer() -> Result<()> {
    let app = common::test_app().await?;
    let anna = common::register_ok(&app, "anna", "anna@example.com").await?;
    let slug = common::create_article_ok(&app, &anna, "Follow Me", &[]).await?;

    common::request(
        &app,
        "POST",
        &format!("/api/articles/{}/comments", slug),
        Some(&anna),
        Some(json!({"comment": {"body": "self comment"}})),
    )
    .await?;

    let jake = common::register_ok(&app, "jake", "jake@example.com").await?;
    common::request(&app, "POST", "/api/profiles/anna/follow", Some(&jake), None).await?;

    let (_, body) = common::request(
        &app,
        "GET",
        &format!("/api/articles/{}/comments", slug),
        Some(&jake),
        None,
    )
    .await?;

    assert_eq!(body["comments"][0]["author"]["username"], "anna");
    assert_eq!(body["comments"][0]["author"]["following"], true);
    Ok(())
}

#[tokio::test]
async fn comment_body_cannot_be_blank() -> Result<()> {
    let app = common::test_app().await?;
    let token = common::register_ok(&app, "jake", "jake@example.com").await?;
    let slug = common::create_article_ok(&app, &token, "Quiet Article", &[]).await?;

    let (status, body) = common::request(
        &app,
        "POST",
        &format!("/api/articles/{}/comments", slug),
        Some(&token),
        Some(json!({"comment": {"body": "   "}})),
    )
    .await?;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"]["body"][0], "can't be blank");
    Ok(())
}

#[tokio::test]
async fn comments_need_an_existing_article() -> Result<()> {
    let app = common::test_app().await?;
    let token = common::register_ok(&app, "jake", "jake@example.com").await?;

    let (status, _) = common::request(
        &app,
        "GET",
        "/api/articles/no-such-slug/comments",
        None,
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = common::request(
        &app,
        "POST",
        "/api/articles/no-such-slug/comments",
        Some(&token),
        Some(json!({"comment": {"body": "ghost"}})),
    )
    .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn create_comment_requires_auth() -> Result<()> {
    let app = common::test_app().await?;
    let token = common::register_ok(&app, "jake", "jake@example.com").await?;
    let slug = common::create_article_ok(&app, &token, "Locked Thread", &[]).await?;

    let (status, _) = common::request(
        &app,
        "POST",
        &format!("/api/articles/{}/comments", slug),
        None,
        Some(json!({"comment": {"body": "anon"}})),
    )
    .await?;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn delete_comment_is_author_only() -> Result<()> {
    let app = common::test_app().await?;
    let author = common::register_ok(&app, "jake", "jake@example.com").await?;
    let slug = common::create_article_ok(&app, &author, "Moderated Thread", &[]).await?;

    let commenter = common::register_ok(&app, "anna", "anna@example.com").await?;
    let (_, body) = common::request(
        &app,
        "POST",
        &format!("/api/articles/{}/comments", slug),
        Some(&commenter),
        Some(json!({"comment": {"body": "mine"}})),
    )
    .await?;
    let id = body["comment"]["id"].as_i64().unwrap();

    // The article author does not own the comment
    let (status, body) = common::request(
        &app,
        "DELETE",
        &format!("/api/articles/{}/comments/{}", slug, id),
        Some(&author),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["errors"]["body"][0], "Only the author can delete a comment");

    let (status, _) = common::request(
        &app,
        "DELETE",
        &format!("/api/articles/{}/comments/{}", slug, id),
        None,
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // The comment author can
    let (status, _) = common::request(
        &app,
        "DELETE",
        &format!("/api/articles/{}/comments/{}", slug, id),
        Some(&commenter),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = common::request(
        &app,
        "GET",
        &format!("/api/articles/{}/comments", slug),
        None,
        None,
    )
    .await?;
    assert_eq!(body["comments"], json!([]));
    Ok(())
}

#[tokio::test]
async fn delete_comment_checks_the_slug() -> Result<()> {
    let app = common::test_app().await?;
    let token = common::register_ok(&app, "jake", "jake@example.com").await?;
    let commented = common::create_article_ok(&app, &token, "Has Comment", &[]).await?;
    let other = common::create_article_ok(&app, &token, "Has None", &[]).await?;

    let (_, body) = common::request(
        &app,
        "POST",
        &format!("/api/articles/{}/comments", commented),
        Some(&token),
        Some(json!({"comment": {"body": "here"}})),
    )
    .await?;
    let id = body["comment"]["id"].as_i64().unwrap();

    // Right id, wrong article
    let (status, _) = common::request(
        &app,
        "DELETE",
        &format!("/api/articles/{}/comments/{}", other, id),
        Some(&token),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Still deletable where it actually lives
    let (status, _) = common::request(
        &app,
        "DELETE",
        &format!("/api/articles/{}/comments/{}", commented, id),
        Some(&token),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::NO_CONTENT);
    Ok(())
}
