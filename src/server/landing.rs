//! Informational page served at `/`

use actix_web::{HttpRequest, HttpResponse};

const EXAMPLE_MODULE: &str = "https://esm.town/v/maxm/blitheJadeBee";

/// Render the landing page with an example import pointing at this host
pub async fn landing(req: HttpRequest) -> HttpResponse {
    let host = req.connection_info().host().to_string();
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(render(&host))
}

fn render(host: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
	<title>TypeScript Bundle Service</title>
	<style>
		body {{ font-family: system-ui; max-width: 800px; margin: 40px auto; padding: 0 20px; line-height: 1.6; }}
		pre {{ background: #f4f4f4; padding: 15px; border-radius: 5px; }}
	</style>
</head>
<body>
	<h1>TypeScript Bundle Service</h1>
	<p>This service bundles TypeScript files into JavaScript. To use it, append a URL to a TypeScript file to this domain.</p>
	<p>Example usage:</p>
	<pre>import "<a href="//{host}/{module}">https://{host}/{module}</a>"</pre>
</body>
</html>"#,
        host = host,
        module = EXAMPLE_MODULE,
    )
}
