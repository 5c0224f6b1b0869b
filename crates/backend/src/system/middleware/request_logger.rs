use axum::body::{to_bytes, Body};
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;
use chrono::Local;

/// Middleware для логирования HTTP запросов
///
/// Одна строка на запрос: время, длительность (ms), размер ответа,
/// статус, метод и путь. Успешные ответы подсвечиваются зелёным,
/// остальные жёлтым.
pub async fn request_logger(req: Request<Body>, next: Next) -> Response {
    let start = std::time::Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_owned();

    let response = next.run(req).await;
    let (parts, body) = response.into_parts();

    // Читаем тело ответа, чтобы узнать реальный размер
    let (bytes, size) = match to_bytes(body, usize::MAX).await {
        Ok(b) => {
            let size = format_size(b.len());
            (b, size)
        }
        Err(e) => {
            tracing::warn!("Failed to buffer response body for {} {}: {}", method, path, e);
            (Default::default(), "error".to_string())
        }
    };

    let status = parts.status.as_u16();
    let color_code = if parts.status.is_success() { "32" } else { "33" };

    println!(
        "\x1b[{}m{}\x1b[0m | {:>5}ms | {:>12} | {} {:>6} {}",
        color_code,
        Local::now().format("%H:%M:%S"),
        start.elapsed().as_millis(),
        size,
        status,
        method,
        path
    );
    tracing::debug!(status, method = %method, path = %path, "request handled");

    Response::from_parts(parts, Body::from(bytes))
}

/// Размер в байтах с разделителем тысяч: 1234567 -> "1.234.567"
fn format_size(n: usize) -> String {
    let digits = n.to_string();
    let head = digits.len() % 3;
    let mut groups: Vec<&str> = Vec::new();
    if head > 0 {
        groups.push(&digits[..head]);
    }
    groups.extend(
        digits.as_bytes()[head..]
            .chunks(3)
            .map(|chunk| std::str::from_utf8(chunk).unwrap_or_default()),
    );
    groups.join(".")
}
