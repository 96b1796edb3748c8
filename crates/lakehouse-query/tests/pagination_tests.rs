use lakehouse_query::{build_paginated_sql, split_order_by, PageRequest, DEFAULT_ORDER_BY};

#[test]
fn test_default_ordering_and_offset_for_many_pages() {
    let statements = [
        "SELECT * FROM t",
        "select id, name from dbo.players where rating > 80",
        "  SELECT COUNT(*) AS c FROM t GROUP BY x  ",
    ];

    for sql in statements {
        for (page, size) in [(1u64, 1u64), (2, 10), (7, 50), (40, 200)] {
            let rewritten = build_paginated_sql(sql, page, size);
            assert!(rewritten.contains(DEFAULT_ORDER_BY), "{}", rewritten);
            assert!(
                rewritten.contains(&format!(
                    "OFFSET {} ROWS FETCH NEXT {} ROWS ONLY",
                    (page - 1) * size,
                    size
                )),
                "{}",
                rewritten
            );
        }
    }
}

#[test]
fn test_trailing_order_by_moves_to_outer_query() {
    let rewritten = build_paginated_sql("SELECT * FROM t ORDER BY col ASC", 1, 20);

    let from_pos = rewritten.find("FROM base_query").unwrap();
    let order_pos = rewritten.find("ORDER BY col ASC").unwrap();
    let offset_pos = rewritten.find("OFFSET").unwrap();
    assert!(from_pos < order_pos);
    assert!(order_pos < offset_pos);

    let cte_start = rewritten.find("WITH base_query AS (").unwrap();
    let cte_end = rewritten.find("\n)\n").unwrap();
    let cte_body = &rewritten[cte_start..cte_end];
    assert!(!cte_body.to_lowercase().contains("order by"));
    assert!(!rewritten.contains(DEFAULT_ORDER_BY));
}

#[test]
fn test_rewrite_is_deterministic() {
    let sql = "SELECT a FROM t ORDER BY a";
    assert_eq!(
        build_paginated_sql(sql, 3, 30),
        build_paginated_sql(sql, 3, 30)
    );
}

#[test]
fn test_first_page_always_starts_at_zero() {
    for size in [1u64, 10, 50, 200] {
        let rewritten = build_paginated_sql("SELECT 1 AS one", 1, size);
        assert!(rewritten.contains("OFFSET 0 ROWS"));
    }
}

#[test]
fn test_clamped_page_size_flows_into_fetch() {
    let page = PageRequest::normalize(Some(2), Some(500));
    let rewritten = build_paginated_sql("SELECT * FROM t", page.page, page.page_size);
    assert_eq!(page.page_size, 200);
    assert!(rewritten.contains("OFFSET 200 ROWS FETCH NEXT 200 ROWS ONLY"));
}

#[test]
fn test_order_by_without_word_boundary_is_still_matched() {
    // The heuristic has no word boundary, so a column named like "border"
    // followed by "by" text is split too.
    let (body, order) = split_order_by("SELECT border by_x FROM t");
    assert_eq!(body, "SELECT b");
    assert_eq!(order, Some("order by_x FROM t"));
}
