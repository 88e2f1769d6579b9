//! Shared fixtures for tests.

/// A well-formed provider document touching most phase blocks.
pub fn sample_source() -> &'static str {
    SAMPLE
}

const SAMPLE: &str = r#"syntax "next-router/0.1";

# Gateway provider wired for the OpenAI Responses API.
provider "openai" {
  defaults {
    upstream_config {
      base_url = "https://api.openai.com";
    }
    auth {
      auth_bearer "OPENAI_API_KEY";
    }
    request {
      req_map openai_chat_to_openai_responses;
      set_header "Accept" "application/json";
    }
    response {
      resp_map openai_responses_to_openai_chat;
      sse_parse openai_responses_to_openai_chunks;
    }
    metrics {
      usage_extract openai;
    }
  }
  match model = "gpt-*" {
    upstream {
      set_path "/v1/responses";
    }
  }
}
"#;
