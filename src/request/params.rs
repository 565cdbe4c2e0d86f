use std::borrow::Cow;
use std::collections::BTreeMap;
use std::sync::Arc;
use encoding_rs::Encoding;
use percent_encoding::percent_decode;
use url::form_urlencoded;

/// 래핑 시점의 요청 파라미터 사본
///
/// 쿼리 문자열과 폼 본문에서 만든 이름 → 값 목록입니다. 값은 도착 순서를 유지합니다.
/// 생성 후에는 바뀌지 않으며 변경 API 도 없습니다.
#[derive(Debug, Clone, Default)]
pub struct ParameterSnapshot {
    values: Arc<BTreeMap<String, Vec<String>>>,
}

impl ParameterSnapshot {
    /// 쿼리 문자열은 UTF-8 로, 폼 본문은 요청에 선언된 `form_encoding` 으로 디코딩합니다.
    pub fn capture(query: Option<&str>, form_body: Option<&[u8]>, form_encoding: &'static Encoding) -> Self {
        let mut values: BTreeMap<String, Vec<String>> = BTreeMap::new();

        let query_pairs = query
            .into_iter()
            .flat_map(|q| form_urlencoded::parse(q.as_bytes()))
            .map(|(name, value)| (name.into_owned(), value.into_owned()));
        let form_pairs = form_body
            .into_iter()
            .flat_map(move |body| parse_form(body, form_encoding));

        for (name, value) in query_pairs.chain(form_pairs) {
            values.entry(name).or_default().push(value);
        }

        Self {
            values: Arc::new(values),
        }
    }

    /// 첫 번째 값
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    pub fn get_all(&self, name: &str) -> &[String] {
        self.values.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn as_map(&self) -> &BTreeMap<String, Vec<String>> {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn parse_form<'a>(body: &'a [u8], encoding: &'static Encoding) -> impl Iterator<Item = (String, String)> + 'a {
    body.split(|&b| b == b'&')
        .filter(|pair| !pair.is_empty())
        .map(move |pair| {
            let (name, value) = match pair.iter().position(|&b| b == b'=') {
                Some(pos) => (&pair[..pos], &pair[pos + 1..]),
                None => (pair, &[][..]),
            };
            (decode_component(name, encoding), decode_component(value, encoding))
        })
}

// `+` 는 퍼센트 디코딩 전에 공백으로 바꾼다
fn decode_component(raw: &[u8], encoding: &'static Encoding) -> String {
    let spaced: Vec<u8> = raw.iter().map(|&b| if b == b'+' { b' ' } else { b }).collect();
    let decoded: Cow<'_, [u8]> = percent_decode(&spaced).into();
    encoding.decode_without_bom_handling(&decoded).0.into_owned()
}
