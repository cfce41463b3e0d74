use wagman_client::sim::framed;
use wagman_client::transport::MockReply;

/// Replies of a healthy controller to every telemetry command.
pub(crate) fn healthy_reply(request: &str) -> MockReply {
    let body: &[&str] = match request {
        "id" => &["WAGMAN01"],
        "ver" => &["hw 3  1", "  fw 4 0 2 "],
        "up" => &["86400"],
        "date" => &["2024 3 7 9 5 0"],
        "cu" => &["120  315", "280"],
        "th" => &["1\t2 3"],
        "hb" => &["5000", "4200"],
        "fc" => &["0 0  0"],
        "bs 0" => &["OK"],
        "bs 1" => &["FAIL"],
        _ => return MockReply::lines(["invalid command"]),
    };
    MockReply::lines(framed(request, body.iter().copied()))
}
