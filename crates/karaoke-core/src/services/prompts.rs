//! Prompts sent to the oracle. Wording is tuned by hand; the parsing side
//! does not depend on it beyond the field names.

use crate::ports::OracleRequest;

pub const WORLD_HITS_COUNT: usize = 6;

pub fn search(query: &str) -> OracleRequest {
  let prompt = format!(
    r#"Search for instrumental and karaoke versions of: "{query}".
You must include video links that are official karaoke or instrumental versions.

Return JSON in this shape:
[
  {{
    "title": "Name",
    "artist": "Artist",
    "instrumentalSources": [
      {{
        "title": "Source title",
        "uri": "URL (full link for videos)",
        "type": "youtube" or "karaoke",
        "videoId": "VIDEO_ID_IF_VIDEO"
      }}
    ]
  }}
]"#
  );

  OracleRequest { prompt, grounded: true, expect_json: false }
}

pub fn world_hits() -> OracleRequest {
  let prompt = format!(
    "List {WORLD_HITS_COUNT} world famous songs (top hits) from different genres. \
     Return a JSON array of objects with title and artist."
  );

  OracleRequest { prompt, grounded: false, expect_json: true }
}

pub fn lyrics(title: &str, artist: &str) -> OracleRequest {
  let prompt = format!(r#"Full lyrics of "{title}" by "{artist}". Lyrics only."#);
  OracleRequest { prompt, grounded: true, expect_json: false }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn search_prompt_mentions_query_and_fields() {
    let req = search("hallelujah");

    assert!(req.prompt.contains("\"hallelujah\""));
    assert!(req.prompt.contains("instrumentalSources"));
    assert!(req.grounded);
  }

  #[test]
  fn world_hits_asks_for_json() {
    let req = world_hits();
    assert!(req.expect_json);
    assert!(req.prompt.contains("6"));
  }
}
