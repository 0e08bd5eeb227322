mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use common::TestServer;

/// Registers a user, promotes it directly through the state and logs in again so the
/// token carries the new role.
async fn admin_token(server: &TestServer, email: &str) -> Result<(String, String)> {
    let (id, _) = server.register_and_login(email).await?;
    server.state.users.make_admin(&id).await?;
    let token = server.login(email, "secret").await?;
    Ok((id, token))
}

#[tokio::test]
async fn customers_cannot_reach_admin_routes() -> Result<()> {
    let server = TestServer::start().await?;
    let (_, token) = server.register_and_login("ana@example.com").await?;

    let res = server.get("/api/v1/admin/users", &token).send().await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: Value = res.json().await?;
    assert_eq!(body["code"], "FORBIDDEN");

    let res = server.client.get(server.url("/api/v1/admin/users")).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn admins_list_users_and_promote_others() -> Result<()> {
    let server = TestServer::start().await?;
    let (_, admin) = admin_token(&server, "root@example.com").await?;
    let (bob, _) = server.register_and_login("bob@example.com").await?;

    let body: Value = server.get("/api/v1/admin/users", &admin).send().await?.json().await?;
    assert_eq!(body["data"]["totalCount"], 2);

    let res = server.patch(&format!("/api/v1/admin/users/{}/makeadmin", bob), &admin).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["role"], 1);

    // Admins bypass ownership checks.
    let res = server.get(&format!("/api/v1/users/{}", bob), &admin).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn role_path_refuses_admin() -> Result<()> {
    let server = TestServer::start().await?;
    let (id, token) = server.register_and_login("ana@example.com").await?;

    let res = server.patch(&format!("/api/v1/users/{}/1", id), &token).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = server.patch(&format!("/api/v1/users/{}/2", id), &token).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["role"], 2);
    Ok(())
}

#[tokio::test]
async fn admins_manage_languages() -> Result<()> {
    let server = TestServer::start().await?;
    let (_, admin) = admin_token(&server, "root@example.com").await?;
    let (_, customer) = server.register_and_login("ana@example.com").await?;

    let res = server
        .post("/api/v1/admin/languages", &admin)
        .json(&json!({ "name": "Spanish", "alpha2Code": "ES", "alpha3Code": "spa" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await?;
    let id = body["data"]["id"].as_str().unwrap_or_default().to_string();
    assert_eq!(body["data"]["alpha2Code"], "es");

    let res = server
        .post("/api/v1/admin/languages", &admin)
        .json(&json!({ "name": "Broken", "alpha2Code": "e5", "alpha3Code": "brk" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = server
        .patch("/api/v1/admin/languages", &admin)
        .json(&json!({ "id": id, "name": "Español" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["name"], "Español");
    assert_eq!(body["data"]["alpha3Code"], "spa");

    let res = server.get(&format!("/api/v1/languages/{}", id), &customer).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = server.delete(&format!("/api/v1/admin/languages/{}", id), &customer).send().await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = server.delete(&format!("/api/v1/admin/languages/{}", id), &admin).send().await?;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = server.get(&format!("/api/v1/languages/{}", id), &customer).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}
