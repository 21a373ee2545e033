mod runtime;

mod test_http_api;
