//! End-to-end build: scan a real directory, compile endpoint requests,
//! write the output directory, and read the documents back from disk.

use serde_json::Value;
use std::fs;
use std::path::Path;
use strata::compile::{Api, ApiOptions};
use strata::config::{EndpointSpec, SortOrder, SortRule};
use strata::scan;
use tempfile::TempDir;

/// A `movies/:genre/:year` catalogue: five ghost movies plus one
/// science-fiction entry written as front-matter markdown.
fn setup_catalogue() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let movies = tmp.path().join("movies");
    fs::create_dir_all(movies.join("ghosts")).unwrap();
    fs::create_dir_all(movies.join("science-fiction")).unwrap();

    let ghosts = [
        ("1982", "Poltergeist"),
        ("1999", "The Sixth Sense"),
        ("2002", "The Ring"),
        ("2005", "Corpse Bride"),
        ("2016", "Ghostbusters"),
    ];
    for (year, title) in ghosts {
        fs::write(
            movies.join(format!("ghosts/{year}.yml")),
            format!("title: {title}\nreleased: {year}"),
        )
        .unwrap();
    }

    fs::write(
        movies.join("science-fiction/2016.md"),
        "---\ntitle: Arrival\nreleased: 2016\n---\nA linguist decodes an alien language.",
    )
    .unwrap();

    tmp
}

fn api(tmp: &TempDir) -> Api {
    Api::new(ApiOptions {
        blueprint: format!("{}/movies/:genre/:year", tmp.path().display()),
        output: tmp.path().join("output"),
        pluralize: true,
        inject_ids: true,
    })
    .unwrap()
}

fn read_document(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn full_build_writes_the_main_collection() {
    let tmp = setup_catalogue();
    let api = api(&tmp);
    let snapshot = scan::walk(api.base_directory()).unwrap();

    let documents = api.compile(&snapshot, &EndpointSpec::default()).unwrap();
    api.reset_output().unwrap();
    api.write(&documents).unwrap();

    let doc = read_document(&api.output_directory().join("genres.json"));
    let results = doc["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);

    let ghosts = &results[0];
    assert_eq!(ghosts["genre_id"], "ghosts");
    let years = ghosts["years"].as_array().unwrap();
    assert_eq!(years.len(), 5);
    // Unsorted lists follow file-name order.
    assert_eq!(years[0]["title"], "Poltergeist");
    assert_eq!(years[4]["title"], "Ghostbusters");
    assert!(years[0]["year_id"].is_string());

    assert_eq!(doc["metadata"]["itemsPerPage"], 10);
    assert_eq!(doc["metadata"]["pages"], 1);
}

#[test]
fn front_matter_records_carry_their_body() {
    let tmp = setup_catalogue();
    let api = api(&tmp);
    let snapshot = scan::walk(api.base_directory()).unwrap();

    let documents = api.compile(&snapshot, &EndpointSpec::default()).unwrap();
    let results = &documents["genres.json"]["results"];

    let sci_fi = &results[1];
    assert_eq!(sci_fi["genre_id"], "science-fiction");
    let record = &sci_fi["years"][0];
    assert_eq!(record["title"], "Arrival");
    assert_eq!(record["released"], 2016);
    assert_eq!(record["__body"], "A linguist decodes an alien language.");
}

#[test]
fn grouped_request_paginates_each_bucket_with_links() {
    let tmp = setup_catalogue();
    let api = api(&tmp);
    let snapshot = scan::walk(api.base_directory()).unwrap();

    let mut request = EndpointSpec {
        group_by: vec!["genre".to_string()],
        items_per_page: 2,
        ..EndpointSpec::default()
    };
    request.sort.insert(
        "year".to_string(),
        SortRule {
            field: Some("released".to_string()),
            order: SortOrder::Descending,
        },
    );

    let documents = api.compile(&snapshot, &request).unwrap();
    api.reset_output().unwrap();
    api.write(&documents).unwrap();

    let out = api.output_directory();
    let first = read_document(&out.join("ghosts.json"));
    let second = read_document(&out.join("ghosts-2.json"));
    let third = read_document(&out.join("ghosts-3.json"));

    // Descending by release year, split 2 + 2 + 1.
    assert_eq!(first["results"][0]["title"], "Ghostbusters");
    assert_eq!(first["results"][1]["title"], "Corpse Bride");
    assert_eq!(second["results"][0]["title"], "The Ring");
    assert_eq!(second["results"][1]["title"], "The Sixth Sense");
    assert_eq!(third["results"][0]["title"], "Poltergeist");

    assert_eq!(first["metadata"]["pages"], 3);
    assert_eq!(first["metadata"]["nextPage"], "/ghosts-2.json");
    assert!(first["metadata"].get("previousPage").is_none());
    assert_eq!(second["metadata"]["previousPage"], "/ghosts.json");
    assert_eq!(second["metadata"]["nextPage"], "/ghosts-3.json");
    assert!(third["metadata"].get("nextPage").is_none());

    // The single science-fiction entry fits one page.
    let sci_fi = read_document(&out.join("science-fiction.json"));
    assert_eq!(sci_fi["results"].as_array().unwrap().len(), 1);
    assert_eq!(sci_fi["metadata"]["pages"], 1);
}

#[test]
fn leaf_level_groups_bypass_pagination() {
    let tmp = setup_catalogue();
    let api = api(&tmp);
    let snapshot = scan::walk(api.base_directory()).unwrap();

    let request = EndpointSpec {
        group_by: vec!["year".to_string()],
        ..EndpointSpec::default()
    };
    let documents = api.compile(&snapshot, &request).unwrap();
    api.reset_output().unwrap();
    api.write(&documents).unwrap();

    let doc = read_document(&api.output_directory().join("ghosts/2002.json"));
    assert_eq!(doc["title"], "The Ring");
    assert!(doc["year_id"].is_string());
    assert!(doc.get("metadata").is_none());

    // Markdown leaves group the same way, keyed without the extension.
    let arrival = read_document(&api.output_directory().join("science-fiction/2016.json"));
    assert_eq!(arrival["title"], "Arrival");
}

#[test]
fn rerooted_request_inverts_the_hierarchy() {
    let tmp = setup_catalogue();
    let api = api(&tmp);
    let snapshot = scan::walk(api.base_directory()).unwrap();

    let request = EndpointSpec {
        root: Some("year".to_string()),
        ..EndpointSpec::default()
    };
    let documents = api.compile(&snapshot, &request).unwrap();

    // Six files, one leaf endpoint each.
    let results = documents["years.json"]["results"].as_array().unwrap();
    assert_eq!(results.len(), 6);
}

#[test]
fn dropping_the_leaf_level_leaves_id_stubs() {
    let tmp = setup_catalogue();
    let api = api(&tmp);
    let snapshot = scan::walk(api.base_directory()).unwrap();

    // Only the genre level stays visible: no file is ever read, and the
    // collection is a bare list of genre identifiers.
    let request = EndpointSpec {
        levels: Some(vec!["genre".to_string()]),
        ..EndpointSpec::default()
    };
    let documents = api.compile(&snapshot, &request).unwrap();
    let results = documents["genres.json"]["results"].as_array().unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0], serde_json::json!({"genre_id": "ghosts"}));
    assert_eq!(results[1], serde_json::json!({"genre_id": "science-fiction"}));
}
