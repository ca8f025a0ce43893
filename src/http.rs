use std::thread;
use std::time::Duration;

fn should_retry_http_status(status: u16) -> bool {
    status == 408 || status == 429 || (500..=599).contains(&status)
}

enum Payload<'a> {
    Get,
    PostJson(&'a str),
}

pub(crate) fn get_text_with_retries(
    url: &str,
    headers: &[(String, String)],
    query: &[(String, String)],
    connect_timeout: Duration,
    read_timeout: Duration,
    attempts: usize,
    retry_delay: Duration,
) -> Result<String, String> {
    send_with_retries(
        url,
        headers,
        query,
        Payload::Get,
        connect_timeout,
        read_timeout,
        attempts,
        retry_delay,
    )
}

pub(crate) fn post_json_with_retries(
    url: &str,
    headers: &[(String, String)],
    query: &[(String, String)],
    body: &str,
    connect_timeout: Duration,
    read_timeout: Duration,
    attempts: usize,
    retry_delay: Duration,
) -> Result<String, String> {
    send_with_retries(
        url,
        headers,
        query,
        Payload::PostJson(body),
        connect_timeout,
        read_timeout,
        attempts,
        retry_delay,
    )
}

fn send_with_retries(
    url: &str,
    headers: &[(String, String)],
    query: &[(String, String)],
    payload: Payload<'_>,
    connect_timeout: Duration,
    read_timeout: Duration,
    attempts: usize,
    retry_delay: Duration,
) -> Result<String, String> {
    let attempts = attempts.max(1);

    for attempt in 1..=attempts {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(connect_timeout)
            .timeout_read(read_timeout)
            .timeout_write(read_timeout)
            .build();

        let mut request = match &payload {
            Payload::Get => agent.get(url),
            Payload::PostJson(_) => agent
                .post(url)
                .set("Content-Type", "application/json"),
        };
        for (key, value) in headers {
            request = request.set(key, value);
        }
        for (key, value) in query {
            request = request.query(key, value);
        }

        let outcome = match &payload {
            Payload::Get => request.call(),
            Payload::PostJson(body) => request.send_string(body),
        };

        match outcome {
            Ok(response) => match response.into_string() {
                Ok(body) => return Ok(body),
                Err(err) => {
                    return Err(format!("request failed: response decode failed: {err}"));
                }
            },
            Err(ureq::Error::Status(status, response)) => {
                let response_body = response.into_string().ok().unwrap_or_default();
                let body = response_body.trim();
                let status_error = if body.is_empty() {
                    format!("HTTP status {status}")
                } else {
                    let truncated = body.chars().take(240).collect::<String>();
                    format!("HTTP status {status} ({truncated})")
                };

                if should_retry_http_status(status) && attempt < attempts {
                    thread::sleep(retry_delay);
                    continue;
                }

                if should_retry_http_status(status) {
                    return Err(format!(
                        "request failed after {attempts} attempt(s): {status_error}"
                    ));
                }

                return Err(format!("request failed: {status_error}"));
            }
            Err(ureq::Error::Transport(err)) => {
                let transport_error = format!("transport error: {err}");
                if attempt < attempts {
                    thread::sleep(retry_delay);
                    continue;
                }
                return Err(format!(
                    "request failed after {attempts} attempt(s): {transport_error}"
                ));
            }
        }
    }

    Err("request failed: exhausted attempts without a concrete error".to_string())
}
