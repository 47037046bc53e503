//! Cassette replay integration tests, with no network I/O.
//!
//! Each test writes a cassette of canned HTTP replies and points
//! `TOGETHER_NODE_REPLAY` at it, so the binary never contacts the API.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use base64::Engine;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use predicates::prelude::*;
use serde_json::{json, Value};
use together_node::cassette::format::{Cassette, Interaction};

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("together_node_replay_{name}"));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn cmd(dir: &Path, cassette: &Path) -> Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("together-node");
    cmd.current_dir(dir)
        .env("TOGETHER_NODE_REPLAY", cassette)
        .env("TOGETHER_NODE_CONFIG", dir.join("missing-config.toml"))
        .env_remove("TOGETHER_API_KEY")
        .env_remove("TOGETHER_NODE_REC")
        .env_remove("RUST_LOG");
    cmd
}

fn png_bytes(width: u32, height: u32, color: [u8; 3]) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb(color));
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img).write_to(&mut buf, ImageFormat::Png).unwrap();
    buf.into_inner()
}

/// A replayed reply: `status` plus raw body bytes.
fn reply(status: u16, body: &[u8]) -> Value {
    let encoded = base64::engine::general_purpose::STANDARD.encode(body);
    json!({"Ok": {"status": status, "body": encoded}})
}

fn write_cassette(dir: &Path, outputs: Vec<Value>) -> PathBuf {
    let interactions = outputs
        .into_iter()
        .zip(0u64..)
        .map(|(output, seq)| Interaction {
            seq,
            port: "transport".into(),
            method: "send".into(),
            input: json!({}),
            output,
        })
        .collect();
    let cassette = Cassette {
        name: "integration".into(),
        recorded_at: chrono::Utc::now(),
        commit: "test".into(),
        interactions,
    };
    let path = dir.join("replay.cassette.yaml");
    std::fs::write(&path, serde_yaml::to_string(&cassette).unwrap()).unwrap();
    path
}

fn inline_success(png: &[u8]) -> Value {
    let b64 = base64::engine::general_purpose::STANDARD.encode(png);
    let body = json!({"id": "gen-1", "data": [{"index": 0, "b64_json": b64}]});
    reply(200, body.to_string().as_bytes())
}

fn assert_solid(path: &Path, dims: (u32, u32), color: [u8; 3]) {
    let img = image::open(path).unwrap().to_rgb8();
    assert_eq!(img.dimensions(), dims);
    assert!(img.pixels().all(|p| p.0 == color), "expected solid {color:?}");
}

#[test]
fn inline_payload_is_saved_at_requested_size() {
    let dir = scratch_dir("inline");
    let cassette = write_cassette(&dir, vec![inline_success(&png_bytes(256, 320, [0, 0, 255]))]);
    let out = dir.join("out.png");

    cmd(&dir, &cassette)
        .args(["-W", "256", "-H", "320", "-o", out.to_str().unwrap(), "a blue square"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Saved:"));

    assert_solid(&out, (256, 320), [0, 0, 255]);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn smaller_payload_is_resized() {
    let dir = scratch_dir("resize");
    let cassette = write_cassette(&dir, vec![inline_success(&png_bytes(32, 16, [0, 255, 0]))]);
    let out = dir.join("out.png");

    cmd(&dir, &cassette)
        .args(["-W", "512", "-H", "256", "-o", out.to_str().unwrap(), "a green field"])
        .assert()
        .success();

    let img = image::open(&out).unwrap().to_rgb8();
    assert_eq!(img.dimensions(), (512, 256));
    assert_eq!(img.get_pixel(256, 128).0, [0, 255, 0]);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn authentication_failure_writes_fallback() {
    let dir = scratch_dir("auth");
    let cassette = write_cassette(
        &dir,
        vec![reply(401, br#"{"error":{"message":"Invalid API key provided"}}"#)],
    );
    let out = dir.join("out.png");

    cmd(&dir, &cassette)
        .args(["-W", "320", "-H", "256", "-o", out.to_str().unwrap(), "a cat"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Authentication failed"));

    assert_solid(&out, (320, 256), [255, 0, 0]);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn missing_data_field_writes_fallback() {
    let dir = scratch_dir("no_data");
    let cassette = write_cassette(&dir, vec![reply(200, br#"{"id":"gen-2","model":"m"}"#)]);
    let out = dir.join("out.png");

    cmd(&dir, &cassette)
        .args(["-W", "256", "-H", "256", "-o", out.to_str().unwrap(), "a cat"])
        .assert()
        .success();

    assert_solid(&out, (256, 256), [255, 0, 0]);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn server_error_fails_in_strict_mode() {
    let dir = scratch_dir("strict_500");
    let cassette = write_cassette(&dir, vec![reply(500, b"upstream overloaded")]);

    cmd(&dir, &cassette)
        .args(["--strict", "-o", "never.png", "a cat"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("API error (500)"));

    assert!(!dir.join("never.png").exists());
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn url_payload_is_fetched_from_second_exchange() {
    let dir = scratch_dir("url");
    std::fs::write(dir.join("config.toml"), "[api]\nresponse_format = \"url\"\n").unwrap();
    let body = json!({"data": [{"url": "https://cdn.example/gen-3.png"}]});
    let cassette = write_cassette(
        &dir,
        vec![
            reply(200, body.to_string().as_bytes()),
            reply(200, &png_bytes(256, 256, [10, 20, 30])),
        ],
    );
    let out = dir.join("out.png");

    cmd(&dir, &cassette)
        .env("TOGETHER_NODE_CONFIG", dir.join("config.toml"))
        .args(["-W", "256", "-H", "256", "-o", out.to_str().unwrap(), "a dusk sky"])
        .assert()
        .success();

    assert_solid(&out, (256, 256), [10, 20, 30]);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn exhausted_cassette_writes_fallback() {
    let dir = scratch_dir("exhausted");
    let cassette = write_cassette(&dir, vec![]);
    let out = dir.join("out.png");

    cmd(&dir, &cassette)
        .args(["-W", "256", "-H", "384", "-o", out.to_str().unwrap(), "a cat"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Cassette exhausted"));

    assert_solid(&out, (256, 384), [255, 0, 0]);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn lora_request_is_replayed() {
    let dir = scratch_dir("lora");
    let cassette = write_cassette(&dir, vec![inline_success(&png_bytes(256, 256, [5, 5, 5]))]);
    let out = dir.join("out.png");

    cmd(&dir, &cassette)
        .args([
            "-m",
            "black-forest-labs/FLUX.1-dev-lora",
            "--lora-urls",
            "https://example.com/lora1.safetensors, https://example.com/lora2.safetensors",
            "--lora-scales",
            "0.8, 1.2",
            "-W",
            "256",
            "-H",
            "256",
            "-o",
            out.to_str().unwrap(),
            "A futuristic cityscape with neon lights",
        ])
        .assert()
        .success();

    assert_solid(&out, (256, 256), [5, 5, 5]);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn bad_lora_scale_writes_fallback() {
    let dir = scratch_dir("bad_lora");
    let cassette = write_cassette(&dir, vec![inline_success(&png_bytes(256, 256, [5, 5, 5]))]);
    let out = dir.join("out.png");

    cmd(&dir, &cassette)
        .args(["--lora-urls", "https://example.com/a.safetensors", "--lora-scales", "loud"])
        .args(["-W", "256", "-H", "256", "-o", out.to_str().unwrap(), "a cat"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Invalid LoRA scale"));

    assert_solid(&out, (256, 256), [255, 0, 0]);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn jpeg_output_format() {
    let dir = scratch_dir("jpeg_out");
    let cassette = write_cassette(&dir, vec![inline_success(&png_bytes(256, 256, [0, 0, 0]))]);
    let out = dir.join("out.jpg");

    cmd(&dir, &cassette)
        .args(["-f", "jpeg", "-o", out.to_str().unwrap(), "-W", "256", "-H", "256", "night"])
        .assert()
        .success();

    let data = std::fs::read(&out).unwrap();
    assert_eq!(&data[..3], &[0xFF, 0xD8, 0xFF], "Output should be a JPEG file");
    let _ = std::fs::remove_dir_all(&dir);
}
