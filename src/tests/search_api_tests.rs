#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::{json, Value};

    use crate::tests::common::{setup, TestApp};

    fn lemmas(list: &Value) -> Vec<String> {
        list.as_array().unwrap().iter().map(|e| e["lemma"].as_str().unwrap().to_string()).collect()
    }

    async fn translate(app: &TestApp, token: &str, from: i64, to: i64) {
        let res = app
            .call(
                Method::POST,
                &format!("/v1/lex/entries/{}/translate", from),
                Some(token),
                Some(json!({ "translation_id": to })),
            )
            .await;
        assert_eq!(res.status, StatusCode::CREATED);
    }

    #[tokio::test]
    async fn quick_search_ignores_case() {
        let app = setup().await;
        let token = app.editor().await;
        for (lemma, language) in [("House", "en"), ("household", "en"), ("mouse", "en"), ("hiša", "sl")] {
            app.entry(&token, lemma, language).await;
        }

        let res = app.get("/v1/lex/search/quick?query=HOUS").await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.body["full_count"], 2);
        assert_eq!(lemmas(&res.body["entries"]), ["House", "household"]);

        let res = app.get("/v1/lex/search/quick?query=ouse&limit=1&skip=1").await;
        assert_eq!(res.body["full_count"], 3);
        assert_eq!(lemmas(&res.body["entries"]), ["household"]);

        assert_eq!(app.state.metrics.get_snapshot().searches, 2);
    }

    #[tokio::test]
    async fn search_folds_slovene_capitals() {
        let app = setup().await;
        let token = app.editor().await;
        app.entry(&token, "Šola", "sl").await;
        let caj = app.entry(&token, "čaj", "sl").await;
        let res = app
            .call(
                Method::POST,
                "/v1/lex/entries",
                Some(&token),
                Some(json!({ "lemma": "tea", "description": "ZELIŠČNI napitek", "language": "en" })),
            )
            .await;
        let tea = res.body["id"].as_i64().unwrap();

        // šola
        let res = app.get("/v1/lex/search/quick?query=%C5%A1ola").await;
        assert_eq!(res.body["full_count"], 1);
        assert_eq!(lemmas(&res.body["entries"]), ["Šola"]);
        // ČAJ
        let res = app.get("/v1/lex/search/quick?query=%C4%8CAJ").await;
        assert_eq!(res.body["full_count"], 1);
        assert_eq!(lemmas(&res.body["entries"]), ["čaj"]);

        // zeliščni, matched against the description
        translate(&app, &token, tea, caj).await;
        let res = app.get("/v1/lex/search/full?query=zeli%C5%A1%C4%8Dni").await;
        assert_eq!(res.body["full_count"], 1);
        assert_eq!(res.body["entries"][0]["english"]["lemma"], "tea");
        assert_eq!(res.body["entries"][0]["slovene"]["lemma"], "čaj");

        // A rename refreshes the folded copy; žajb
        let res = app
            .call(Method::PUT, &format!("/v1/lex/entries/{}", caj), Some(&token), Some(json!({ "lemma": "Žajbelj" })))
            .await;
        assert_eq!(res.status, StatusCode::OK);
        let res = app.get("/v1/lex/search/quick?query=%C5%BEajb").await;
        assert_eq!(lemmas(&res.body["entries"]), ["Žajbelj"]);
        let res = app.get("/v1/lex/search/quick?query=%C4%8Daj").await;
        assert_eq!(res.body["full_count"], 0);
    }

    #[tokio::test]
    async fn quick_search_filters_by_language() {
        let app = setup().await;
        let token = app.editor().await;
        app.entry(&token, "hiša", "sl").await;
        app.entry(&token, "history", "en").await;

        let res = app.get("/v1/lex/search/quick?query=hi&language=sl").await;
        assert_eq!(lemmas(&res.body["entries"]), ["hiša"]);
        let res = app.get("/v1/lex/search/quick?query=hi&language=english").await;
        assert_eq!(lemmas(&res.body["entries"]), ["history"]);
        let res = app.get("/v1/lex/search/quick?query=hi").await;
        assert_eq!(res.body["full_count"], 2);

        let res = app.get("/v1/lex/search/quick?query=hi&language=de").await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn wildcards_match_literally() {
        let app = setup().await;
        let token = app.editor().await;
        app.entry(&token, "100%", "en").await;
        app.entry(&token, "snake_case", "en").await;
        app.entry(&token, "house", "en").await;

        let res = app.get("/v1/lex/search/quick?query=%25").await;
        assert_eq!(lemmas(&res.body["entries"]), ["100%"]);
        let res = app.get("/v1/lex/search/quick?query=_").await;
        assert_eq!(lemmas(&res.body["entries"]), ["snake_case"]);
    }

    #[tokio::test]
    async fn empty_or_oversized_query_is_rejected() {
        let app = setup().await;
        for uri in ["/v1/lex/search/quick", "/v1/lex/search/quick?query=%20%20", "/v1/lex/search/full?query="] {
            let res = app.get(uri).await;
            assert_eq!(res.status, StatusCode::BAD_REQUEST, "{}", uri);
        }

        let long = "a".repeat(201);
        let res = app.get(&format!("/v1/lex/search/full?query={}", long)).await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn full_search_returns_pairs() {
        let app = setup().await;
        let token = app.editor().await;
        let house = app.entry(&token, "house", "en").await;
        let hisa = app.entry(&token, "hiša", "sl").await;
        app.entry(&token, "mačka", "sl").await;
        let res = app
            .call(
                Method::POST,
                "/v1/lex/entries",
                Some(&token),
                Some(json!({ "lemma": "dog", "description": "an animal", "language": "en" })),
            )
            .await;
        assert_eq!(res.status, StatusCode::CREATED);
        translate(&app, &token, house, hisa).await;

        let res = app.get("/v1/lex/search/full?query=a").await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.body["full_count"], 3);
        let pairs = res.body["entries"].as_array().unwrap();
        assert_eq!(pairs[0]["english"]["lemma"], "dog");
        assert!(pairs[0]["slovene"].is_null());
        assert_eq!(pairs[1]["english"]["lemma"], "house");
        assert_eq!(pairs[1]["slovene"]["lemma"], "hiša");
        assert!(pairs[2]["english"].is_null());
        assert_eq!(pairs[2]["slovene"]["lemma"], "mačka");

        // Only the English side matches, the pair still comes back whole
        let res = app.get("/v1/lex/search/full?query=OUS").await;
        assert_eq!(res.body["full_count"], 1);
        assert_eq!(res.body["entries"][0]["slovene"]["language"], "sl");
    }

    #[tokio::test]
    async fn full_search_normalises_slovene_parents() {
        let app = setup().await;
        let token = app.editor().await;
        let miza = app.entry(&token, "miza", "sl").await;
        let table = app.entry(&token, "table", "en").await;
        translate(&app, &token, miza, table).await;

        let res = app.get("/v1/lex/search/full?query=miza").await;
        assert_eq!(res.body["full_count"], 1);
        assert_eq!(res.body["entries"][0]["english"]["id"], table);
        assert_eq!(res.body["entries"][0]["slovene"]["id"], miza);
    }

    #[tokio::test]
    async fn orphans_are_untranslated_entries() {
        let app = setup().await;
        let token = app.editor().await;
        let house = app.entry(&token, "house", "en").await;
        let hisa = app.entry(&token, "hiša", "sl").await;
        app.entry(&token, "zebra", "en").await;
        app.entry(&token, "antilopa", "sl").await;
        translate(&app, &token, house, hisa).await;

        let res = app.get("/v1/lex/other/orphans").await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(lemmas(&res.body), ["zebra", "antilopa"]);

        let res = app.get("/v1/lex/other/orphans?order=alphabetical&count=1").await;
        assert_eq!(lemmas(&res.body), ["antilopa"]);
    }

    #[tokio::test]
    async fn recent_lists_newest_first() {
        let app = setup().await;
        let token = app.editor().await;
        let first = app.entry(&token, "first", "en").await;
        app.entry(&token, "second", "en").await;
        app.entry(&token, "third", "sl").await;

        let res = app.get("/v1/lex/other/recent").await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(lemmas(&res.body), ["third", "second", "first"]);

        let res = app.get("/v1/lex/other/recent?count=0").await;
        assert_eq!(res.body.as_array().unwrap().len(), 1);

        sqlx::query("UPDATE entries SET modified = '2999-01-01T00:00:00Z' WHERE id = ?1")
            .bind(first)
            .execute(&app.state.db)
            .await
            .unwrap();
        let res = app.get("/v1/lex/other/recent?order=edits&count=2").await;
        assert_eq!(lemmas(&res.body), ["first", "third"]);
    }
}
