use hypr_ws_client::client::Message;
use owhisper_interface::ListenParams;
use owhisper_interface::stream::StreamResponse;

use super::HyprnoteAdapter;
use crate::adapter::{RealtimeSttAdapter, append_path_if_missing, set_scheme_from_host};

impl RealtimeSttAdapter for HyprnoteAdapter {
    fn provider_name(&self) -> &'static str {
        "hyprnote"
    }

    fn is_supported_languages(
        &self,
        languages: &[hypr_language::Language],
        model: Option<&str>,
    ) -> bool {
        HyprnoteAdapter::is_supported_languages_live(languages, model)
    }

    fn supports_native_multichannel(&self) -> bool {
        true
    }

    fn build_ws_url(&self, api_base: &str, params: &ListenParams, channels: u8) -> url::Url {
        let mut url: url::Url = api_base.parse().expect("invalid api_base URL");

        set_scheme_from_host(&mut url);
        append_path_if_missing(&mut url, "listen");

        {
            let mut query = url.query_pairs_mut();

            if let Some(model) = &params.model {
                query.append_pair("model", model);
            }

            query.append_pair("channels", &channels.to_string());
            query.append_pair("sample_rate", &params.sample_rate.to_string());

            for lang in &params.languages {
                query.append_pair("language", lang.to_string().as_str());
            }

            for keyword in &params.keywords {
                query.append_pair("keyword", keyword);
            }

            if let Some(custom) = &params.custom_query {
                for (key, value) in custom {
                    query.append_pair(key, value);
                }
            }
        }

        url
    }

    fn build_auth_header(&self, api_key: Option<&str>) -> Option<(&'static str, String)> {
        api_key.map(|k| ("Authorization", format!("Bearer {}", k)))
    }

    fn keep_alive_message(&self) -> Option<Message> {
        Some(Message::Text(
            serde_json::to_string(&owhisper_interface::ControlMessage::KeepAlive)
                .unwrap()
                .into(),
        ))
    }

    fn finalize_message(&self) -> Message {
        Message::Text(
            serde_json::to_string(&owhisper_interface::ControlMessage::Finalize)
                .unwrap()
                .into(),
        )
    }

    fn parse_response(&self, raw: &str) -> Vec<StreamResponse> {
        serde_json::from_str(raw).into_iter().collect()
    }
}
