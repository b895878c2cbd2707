mod common;

use common::{create_category, register, seed_admin, spawn_app};

#[tokio::test]
async fn category_creation_is_admin_only() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let creator = register(&app, &client, "alice", "CREATOR").await;
    let reader = register(&app, &client, "bob", "READER").await;

    let body = serde_json::json!({
        "name": "Art",
        "coverImage": "https://example.com/art.png",
        "allowImages": true,
    });

    for token in [&creator.token, &reader.token] {
        let response = client
            .post(format!("{}/api/categories", app.address))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 403);
    }

    // Unauthenticated attempts never reach the policy check.
    let response = client
        .post(format!("{}/api/categories", app.address))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);

    let admin_token = seed_admin(&app).await;
    let category = create_category(&app, &client, &admin_token, "Art", true, false, false).await;
    assert_eq!(category["name"], "Art");
    assert_eq!(category["allowImages"], true);
    assert_eq!(category["allowVideos"], false);
    assert_eq!(category["allowTexts"], false);
}

#[tokio::test]
async fn duplicate_category_name_conflicts() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let admin_token = seed_admin(&app).await;

    create_category(&app, &client, &admin_token, "Music", false, true, false).await;

    let response = client
        .post(format!("{}/api/categories", app.address))
        .bearer_auth(&admin_token)
        .json(&serde_json::json!({
            "name": "Music",
            "coverImage": "https://example.com/music.png",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 409);
}

#[tokio::test]
async fn any_authenticated_role_can_list_categories() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let admin_token = seed_admin(&app).await;

    create_category(&app, &client, &admin_token, "Essays", false, false, true).await;

    let reader = register(&app, &client, "reader", "READER").await;
    let response = client
        .get(format!("{}/api/categories", app.address))
        .bearer_auth(&reader.token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let categories: Vec<serde_json::Value> = response.json().await.unwrap();
    assert!(categories.iter().any(|c| c["name"] == "Essays"));
}

#[tokio::test]
async fn category_flags_gate_content_creation() {
    // The reference scenario: creator alice, category "Art" permitting
    // images only. An image succeeds, a video is rejected and nothing
    // is persisted for it.
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let alice = register(&app, &client, "alice", "CREATOR").await;
    let admin_token = seed_admin(&app).await;
    let art = create_category(&app, &client, &admin_token, "Art", true, false, false).await;

    let response = client
        .post(format!("{}/api/content", app.address))
        .bearer_auth(&alice.token)
        .json(&serde_json::json!({
            "title": "Sunset",
            "type": "image",
            "url": "https://example.com/sunset.jpg",
            "category": art["id"],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);

    let response = client
        .post(format!("{}/api/content", app.address))
        .bearer_auth(&alice.token)
        .json(&serde_json::json!({
            "title": "Sunset Timelapse",
            "type": "video",
            "url": "https://example.com/sunset.mp4",
            "category": art["id"],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    // The rejected video never reached the store.
    let listing: Vec<serde_json::Value> = client
        .get(format!("{}/api/content", app.address))
        .bearer_auth(&alice.token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listing.len(), 1);
    assert_eq!(listing[0]["title"], "Sunset");
}

#[tokio::test]
async fn readers_cannot_create_content() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let reader = register(&app, &client, "bob", "READER").await;
    let admin_token = seed_admin(&app).await;
    let cat = create_category(&app, &client, &admin_token, "Open", true, true, true).await;

    let response = client
        .post(format!("{}/api/content", app.address))
        .bearer_auth(&reader.token)
        .json(&serde_json::json!({
            "title": "Nope",
            "type": "image",
            "url": "https://example.com/nope.jpg",
            "category": cat["id"],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);
}

#[tokio::test]
async fn content_in_unknown_category_is_not_found() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let creator = register(&app, &client, "alice", "CREATOR").await;
    let response = client
        .post(format!("{}/api/content", app.address))
        .bearer_auth(&creator.token)
        .json(&serde_json::json!({
            "title": "Orphan",
            "type": "image",
            "url": "https://example.com/orphan.jpg",
            "category": uuid::Uuid::new_v4(),
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn payload_field_must_match_the_content_type() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let creator = register(&app, &client, "alice", "CREATOR").await;
    let admin_token = seed_admin(&app).await;
    let cat = create_category(&app, &client, &admin_token, "Mixed", true, false, true).await;

    // Text content with only a url: rejected.
    let response = client
        .post(format!("{}/api/content", app.address))
        .bearer_auth(&creator.token)
        .json(&serde_json::json!({
            "title": "Essay",
            "type": "text",
            "url": "https://example.com/essay",
            "category": cat["id"],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    // Image content with only text: rejected.
    let response = client
        .post(format!("{}/api/content", app.address))
        .bearer_auth(&creator.token)
        .json(&serde_json::json!({
            "title": "Picture",
            "type": "image",
            "text": "not a url",
            "category": cat["id"],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    // Unknown type: rejected before any lookup.
    let response = client
        .post(format!("{}/api/content", app.address))
        .bearer_auth(&creator.token)
        .json(&serde_json::json!({
            "title": "Podcast",
            "type": "audio",
            "url": "https://example.com/podcast.mp3",
            "category": cat["id"],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn listing_resolves_category_and_creator_references() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let alice = register(&app, &client, "alice", "CREATOR").await;
    let admin_token = seed_admin(&app).await;
    let art = create_category(&app, &client, &admin_token, "Art", false, false, true).await;

    let created: serde_json::Value = client
        .post(format!("{}/api/content", app.address))
        .bearer_auth(&alice.token)
        .json(&serde_json::json!({
            "title": "Thoughts",
            "type": "text",
            "text": "Some profound thoughts.",
            "category": art["id"],
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let listing: Vec<serde_json::Value> = client
        .get(format!("{}/api/content", app.address))
        .bearer_auth(&alice.token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(listing.len(), 1);
    let item = &listing[0];
    assert_eq!(item["id"], created["id"]);
    assert_eq!(item["title"], "Thoughts");
    assert_eq!(item["type"], "text");
    assert_eq!(item["payload"], "Some profound thoughts.");
    assert_eq!(item["category"]["name"], "Art");
    assert_eq!(item["creator"]["username"], "alice");

    // Resolved creators never carry credential material.
    let raw = serde_json::to_string(&listing).unwrap();
    assert!(!raw.contains("argon2"));
    assert!(!raw.contains("passwordHash"));
}

#[tokio::test]
async fn creators_cannot_update_each_others_content() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let alice = register(&app, &client, "alice", "CREATOR").await;
    let victor = register(&app, &client, "victor", "CREATOR").await;
    let admin_token = seed_admin(&app).await;
    let cat = create_category(&app, &client, &admin_token, "Art", true, false, false).await;

    let content: serde_json::Value = client
        .post(format!("{}/api/content", app.address))
        .bearer_auth(&alice.token)
        .json(&serde_json::json!({
            "title": "Original",
            "type": "image",
            "url": "https://example.com/original.jpg",
            "category": cat["id"],
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let content_id = content["id"].as_str().unwrap();

    // A different creator is refused.
    let response = client
        .put(format!("{}/api/content/{}", app.address, content_id))
        .bearer_auth(&victor.token)
        .json(&serde_json::json!({ "title": "Hijacked" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);

    // The owner may update.
    let response = client
        .put(format!("{}/api/content/{}", app.address, content_id))
        .bearer_auth(&alice.token)
        .json(&serde_json::json!({ "title": "Renamed by owner" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    // An admin overrides ownership.
    let response = client
        .put(format!("{}/api/content/{}", app.address, content_id))
        .bearer_auth(&admin_token)
        .json(&serde_json::json!({ "title": "Renamed by admin" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let updated: serde_json::Value = response.json().await.unwrap();
    assert_eq!(updated["title"], "Renamed by admin");
    // References survive the patch untouched.
    assert_eq!(updated["category"], content["category"]);
    assert_eq!(updated["creator"], content["creator"]);
    assert_eq!(updated["createdAt"], content["createdAt"]);
}

#[tokio::test]
async fn patch_replaces_payload_and_kind_together() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let alice = register(&app, &client, "alice", "CREATOR").await;
    let admin_token = seed_admin(&app).await;
    let cat = create_category(&app, &client, &admin_token, "Mixed", true, false, true).await;

    let content: serde_json::Value = client
        .post(format!("{}/api/content", app.address))
        .bearer_auth(&alice.token)
        .json(&serde_json::json!({
            "title": "Mutable",
            "type": "image",
            "url": "https://example.com/v1.jpg",
            "category": cat["id"],
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let content_id = content["id"].as_str().unwrap();

    // A url patch replaces the payload of a media record.
    let response = client
        .put(format!("{}/api/content/{}", app.address, content_id))
        .bearer_auth(&alice.token)
        .json(&serde_json::json!({ "url": "https://example.com/v2.jpg" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let updated: serde_json::Value = response.json().await.unwrap();
    assert_eq!(updated["type"], "image");
    assert_eq!(updated["payload"], "https://example.com/v2.jpg");

    // Switching to the text shape carries the text payload with it.
    let response = client
        .put(format!("{}/api/content/{}", app.address, content_id))
        .bearer_auth(&alice.token)
        .json(&serde_json::json!({ "type": "text", "text": "Now an essay." }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let updated: serde_json::Value = response.json().await.unwrap();
    assert_eq!(updated["type"], "text");
    assert_eq!(updated["payload"], "Now an essay.");

    // Switching back to a media shape without a url is refused.
    let response = client
        .put(format!("{}/api/content/{}", app.address, content_id))
        .bearer_auth(&alice.token)
        .json(&serde_json::json!({ "type": "image" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    // Both payload fields at once is ambiguous and refused.
    let response = client
        .put(format!("{}/api/content/{}", app.address, content_id))
        .bearer_auth(&alice.token)
        .json(&serde_json::json!({
            "type": "image",
            "url": "https://example.com/v3.jpg",
            "text": "also this",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn empty_or_mismatched_patch_payloads_are_rejected() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let alice = register(&app, &client, "alice", "CREATOR").await;
    let admin_token = seed_admin(&app).await;
    let cat = create_category(&app, &client, &admin_token, "Art", true, false, false).await;

    let content: serde_json::Value = client
        .post(format!("{}/api/content", app.address))
        .bearer_auth(&alice.token)
        .json(&serde_json::json!({
            "title": "Stable",
            "type": "image",
            "url": "https://example.com/stable.jpg",
            "category": cat["id"],
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let content_id = content["id"].as_str().unwrap();

    // An empty url must not blank the payload.
    let response = client
        .put(format!("{}/api/content/{}", app.address, content_id))
        .bearer_auth(&alice.token)
        .json(&serde_json::json!({ "url": "" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    // A text body does not pair with an image record.
    let response = client
        .put(format!("{}/api/content/{}", app.address, content_id))
        .bearer_auth(&alice.token)
        .json(&serde_json::json!({ "text": "not a url" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    // The record survives both rejected patches untouched.
    let listing: Vec<serde_json::Value> = client
        .get(format!("{}/api/content", app.address))
        .bearer_auth(&alice.token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listing[0]["payload"], "https://example.com/stable.jpg");
    assert_eq!(listing[0]["type"], "image");
}

#[tokio::test]
async fn immutable_fields_cannot_be_patched() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let alice = register(&app, &client, "alice", "CREATOR").await;
    let admin_token = seed_admin(&app).await;
    let cat = create_category(&app, &client, &admin_token, "Art", true, false, false).await;

    let content: serde_json::Value = client
        .post(format!("{}/api/content", app.address))
        .bearer_auth(&alice.token)
        .json(&serde_json::json!({
            "title": "Fixed home",
            "type": "image",
            "url": "https://example.com/home.jpg",
            "category": cat["id"],
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let content_id = content["id"].as_str().unwrap();

    for patch in [
        serde_json::json!({ "category": uuid::Uuid::new_v4() }),
        serde_json::json!({ "creator": uuid::Uuid::new_v4() }),
        serde_json::json!({ "createdAt": "2020-01-01T00:00:00Z" }),
    ] {
        let response = client
            .put(format!("{}/api/content/{}", app.address, content_id))
            .bearer_auth(&alice.token)
            .json(&patch)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 400, "patch {patch} must be rejected");
    }
}

#[tokio::test]
async fn deletion_is_admin_only_and_returns_the_record() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let alice = register(&app, &client, "alice", "CREATOR").await;
    let admin_token = seed_admin(&app).await;
    let cat = create_category(&app, &client, &admin_token, "Art", true, false, false).await;

    let content: serde_json::Value = client
        .post(format!("{}/api/content", app.address))
        .bearer_auth(&alice.token)
        .json(&serde_json::json!({
            "title": "Ephemeral",
            "type": "image",
            "url": "https://example.com/ephemeral.jpg",
            "category": cat["id"],
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let content_id = content["id"].as_str().unwrap();

    // Even the owning creator may not delete.
    let response = client
        .delete(format!("{}/api/content/{}", app.address, content_id))
        .bearer_auth(&alice.token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);

    let response = client
        .delete(format!("{}/api/content/{}", app.address, content_id))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let removed: serde_json::Value = response.json().await.unwrap();
    assert_eq!(removed["title"], "Ephemeral");

    // Gone means gone.
    let response = client
        .delete(format!("{}/api/content/{}", app.address, content_id))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn updating_missing_content_is_not_found() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let alice = register(&app, &client, "alice", "CREATOR").await;
    let response = client
        .put(format!(
            "{}/api/content/{}",
            app.address,
            uuid::Uuid::new_v4()
        ))
        .bearer_auth(&alice.token)
        .json(&serde_json::json!({ "title": "Ghost" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn content_listing_requires_authentication() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/api/content", app.address))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);
}
