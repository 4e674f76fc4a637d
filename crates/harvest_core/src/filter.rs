use crate::HarvestRequest;

/// Narrows requests to those whose farmer name, crop, variety or location
/// contains `query`, ignoring case. A blank query keeps everything.
pub fn filter_requests<'a>(requests: &'a [HarvestRequest], query: &str) -> Vec<&'a HarvestRequest> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return requests.iter().collect();
    }
    requests
        .iter()
        .filter(|request| matches_query(request, &needle))
        .collect()
}

fn matches_query(request: &HarvestRequest, needle: &str) -> bool {
    [
        request.farmer_name.as_deref(),
        request.crop.as_deref(),
        request.variety(),
        request.location(),
    ]
    .into_iter()
    .flatten()
    .any(|field| field.to_lowercase().contains(needle))
}
