#![allow(dead_code)]

use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use futures_util::future::BoxFuture;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use serde_json::{json, Value};
use wiremock::{Request, Respond, ResponseTemplate};

use scenecraft::{Backoff, Client};

/// 记录每次等待时长而不真正等待。
#[derive(Clone, Default)]
pub struct RecordingBackoff {
    delays: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingBackoff {
    pub fn delays(&self) -> Vec<Duration> {
        self.delays.lock().unwrap().clone()
    }

    pub fn delay_secs(&self) -> Vec<u64> {
        self.delays().iter().map(Duration::as_secs).collect()
    }
}

impl Backoff for RecordingBackoff {
    fn sleep(&self, delay: Duration) -> BoxFuture<'_, ()> {
        self.delays.lock().unwrap().push(delay);
        Box::pin(async {})
    }
}

/// 按顺序返回响应，超出后重复最后一个。
#[derive(Clone)]
pub struct SequenceResponder {
    calls: Arc<AtomicUsize>,
    responses: Vec<ResponseTemplate>,
}

impl SequenceResponder {
    pub fn new(responses: Vec<ResponseTemplate>) -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            responses,
        }
    }

    pub fn calls(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }
}

impl Respond for SequenceResponder {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let idx = self.calls.fetch_add(1, Ordering::SeqCst);
        let last = self.responses.len().saturating_sub(1);
        self.responses[idx.min(last)].clone()
    }
}

pub fn build_client(base_url: &str, backoff: &RecordingBackoff) -> Client {
    Client::builder()
        .api_key("test-key")
        .base_url(base_url)
        .backoff(backoff.clone())
        .build()
        .unwrap()
}

pub fn method_path(model: &str) -> String {
    format!("/v1beta/models/{model}:generateContent")
}

/// 一个已经关闭的本地端口，连接会被拒绝。
pub fn closed_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}

pub fn product_image() -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_pixel(40, 30, Rgba([180, 90, 30, 255])))
}

pub fn scenes_json(count: usize) -> String {
    let scenes: Vec<Value> = (1..=count)
        .map(|n| {
            json!({
                "title": format!("Scene {n}"),
                "prompt": format!("product on pedestal {n}, High resolution, 8k"),
                "reason": format!("理由 {n}")
            })
        })
        .collect();
    serde_json::to_string_pretty(&scenes).unwrap()
}

pub fn text_candidate(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]},
            "finishReason": "STOP",
            "index": 0
        }],
        "modelVersion": "test"
    })
}

pub fn png_base64(width: u32, height: u32) -> String {
    let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
        width,
        height,
        Rgba([12, 200, 90, 255]),
    ));
    let mut data = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut data), ImageFormat::Png)
        .unwrap();
    STANDARD.encode(data)
}

pub fn image_candidate(width: u32, height: u32) -> Value {
    json!({
        "candidates": [{
            "content": {"role": "model", "parts": [
                {"inlineData": {"mimeType": "image/png", "data": png_base64(width, height)}}
            ]},
            "finishReason": "STOP"
        }]
    })
}

pub fn safety_candidate() -> Value {
    json!({
        "candidates": [{"finishReason": "SAFETY", "index": 0}]
    })
}
