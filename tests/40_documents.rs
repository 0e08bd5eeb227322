mod common;

use anyhow::Result;
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde_json::Value;

use common::TestServer;

fn upload_form(context_id: &str, entity_type: &str, entity_id: &str) -> Form {
    Form::new()
        .text("contextId", context_id.to_string())
        .text("entityType", entity_type.to_string())
        .text("entityId", entity_id.to_string())
}

fn text_file(name: &str, content: &str) -> Part {
    Part::bytes(content.as_bytes().to_vec()).file_name(name.to_string())
}

#[tokio::test]
async fn single_upload_round_trip() -> Result<()> {
    let server = TestServer::start().await?;
    let (_, token) = server.register_and_login("ana@example.com").await?;
    let context_id = server.create_context(&token, "1").await?;
    let note = server.create_note(&token, &context_id, "verbs", "x").await?;
    let note_id = note["id"].as_str().unwrap_or_default().to_string();

    let form = upload_form(&context_id, "note", &note_id).part("file", text_file("Verbs.TXT", "ser estar"));
    let res = server.post("/api/v1/documents", &token).multipart(form).send().await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await?;
    let document_id = body["data"]["id"].as_str().unwrap_or_default().to_string();
    assert_eq!(body["data"]["extension"], "txt");
    assert_eq!(body["data"]["noteId"], note_id.as_str());
    assert_eq!(body["data"]["location"], "documents");
    assert!(body["data"]["path"].as_str().is_some_and(|p| p.ends_with("Verbs.TXT")));

    let stored = std::fs::read_to_string(body["data"]["path"].as_str().unwrap_or_default())?;
    assert_eq!(stored, "ser estar");

    let prompts: Value = server
        .get(&format!("/api/v1/contexts/{}/prompts", context_id), &token)
        .send()
        .await?
        .json()
        .await?;
    let values: Vec<&str> = prompts["data"]["content"]
        .as_array()
        .map(|rows| rows.iter().filter_map(|p| p["value"].as_str()).collect())
        .unwrap_or_default();
    assert!(values.contains(&"Prompt(Remember(ser estar))"));

    let res = server.get(&format!("/api/v1/documents/{}", document_id), &token).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = server.delete(&format!("/api/v1/documents/{}", document_id), &token).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let res = server.get(&format!("/api/v1/documents/{}", document_id), &token).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn upload_without_owner_is_standalone() -> Result<()> {
    let server = TestServer::start().await?;
    let (_, token) = server.register_and_login("ana@example.com").await?;
    let context_id = server.create_context(&token, "1").await?;

    let form = Form::new()
        .text("contextId", context_id.clone())
        .part("file", text_file("glossary.txt", "la casa"));
    let res = server.post("/api/v1/documents", &token).multipart(form).send().await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await?;
    assert!(body["data"]["noteId"].is_null());
    assert!(body["data"].get("aiError").is_none());

    let document_id = body["data"]["id"].as_str().unwrap_or_default();
    let res = server.get(&format!("/api/v1/documents/{}", document_id), &token).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn bulk_upload_creates_every_file() -> Result<()> {
    let server = TestServer::start().await?;
    let (_, token) = server.register_and_login("ana@example.com").await?;
    let context_id = server.create_context(&token, "1").await?;
    let note = server.create_note(&token, &context_id, "verbs", "x").await?;
    let note_id = note["id"].as_str().unwrap_or_default().to_string();

    let form = upload_form(&context_id, "note", &note_id)
        .part("files", text_file("a.txt", "alpha"))
        .part("files", text_file("b.txt", "beta"))
        .part("files", text_file("c.md", "gamma"));
    let res = server.post("/api/v1/documents/bulk", &token).multipart(form).send().await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await?;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(3));

    let listed: Value = server.get("/api/v1/documents", &token).send().await?.json().await?;
    assert_eq!(listed["data"]["totalCount"], 3);

    let (_, other) = server.register_and_login("bob@example.com").await?;
    let listed: Value = server.get("/api/v1/documents", &other).send().await?.json().await?;
    assert_eq!(listed["data"]["totalCount"], 0);
    Ok(())
}

#[tokio::test]
async fn uploads_validate_their_parts() -> Result<()> {
    let server = TestServer::start().await?;
    let (_, token) = server.register_and_login("ana@example.com").await?;
    let context_id = server.create_context(&token, "1").await?;

    let form = upload_form(&context_id, "lesson", "1").part("file", text_file("a.txt", "alpha"));
    let res = server.post("/api/v1/documents", &token).multipart(form).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_IMPLEMENTED);

    let form = upload_form(&context_id, "note", "1");
    let res = server.post("/api/v1/documents", &token).multipart(form).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let form = upload_form(&context_id, "", "");
    let res = server.post("/api/v1/documents/bulk", &token).multipart(form).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let (_, other) = server.register_and_login("bob@example.com").await?;
    let form = upload_form(&context_id, "lesson", "1").part("file", text_file("a.txt", "alpha"));
    let res = server.post("/api/v1/documents", &other).multipart(form).send().await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    Ok(())
}
