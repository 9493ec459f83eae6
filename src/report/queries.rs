use crate::config::ReportConfig;

/// One canned question asked of the `transactions` table.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportQuery {
    /// Console banner; also the source of the export file name.
    pub name: &'static str,
    pub sql: String,
    /// Rows shown on the console; `None` takes the runner's default.
    pub row_cap: Option<usize>,
}

impl ReportQuery {
    fn new(name: &'static str, sql: impl Into<String>) -> Self {
        Self {
            name,
            sql: sql.into(),
            row_cap: None,
        }
    }

    fn with_row_cap(mut self, cap: usize) -> Self {
        self.row_cap = Some(cap);
        self
    }
}

const BUSINESS_OVERVIEW: &str = "
SELECT
    COUNT(DISTINCT InvoiceNo) AS Total_Orders,
    COUNT(DISTINCT CustomerID) AS Unique_Customers,
    ROUND(SUM(TotalPrice), 2) AS Total_Revenue,
    ROUND(AVG(TotalPrice), 2) AS Avg_Transaction_Value,
    SUM(Quantity) AS Total_Units_Sold
FROM transactions;
";

const MONTHLY_TRENDS: &str = "
SELECT
    Year,
    Month,
    ROUND(SUM(TotalPrice), 2) AS Monthly_Revenue,
    COUNT(DISTINCT InvoiceNo) AS Orders,
    COUNT(DISTINCT CustomerID) AS Unique_Customers,
    ROUND(AVG(TotalPrice), 2) AS Avg_Transaction_Value
FROM transactions
GROUP BY Year, Month
ORDER BY Year, Month;
";

const TOP_PRODUCTS: &str = "
SELECT
    Description AS Product,
    COUNT(DISTINCT InvoiceNo) AS Orders,
    SUM(Quantity) AS Units_Sold,
    ROUND(SUM(TotalPrice), 2) AS Total_Revenue,
    ROUND(AVG(UnitPrice), 2) AS Avg_Price
FROM transactions
GROUP BY Description
ORDER BY Total_Revenue DESC, Product
LIMIT 20;
";

const TOP_CUSTOMERS: &str = "
SELECT
    CustomerID,
    COUNT(DISTINCT InvoiceNo) AS Total_Orders,
    SUM(Quantity) AS Units_Purchased,
    ROUND(SUM(TotalPrice), 2) AS Total_Spent,
    ROUND(AVG(TotalPrice), 2) AS Avg_Order_Value
FROM transactions
GROUP BY CustomerID
ORDER BY Total_Spent DESC, CustomerID
LIMIT 30;
";

const GEOGRAPHIC_PERFORMANCE: &str = "
SELECT
    Country,
    COUNT(DISTINCT CustomerID) AS Customers,
    COUNT(DISTINCT InvoiceNo) AS Orders,
    ROUND(SUM(TotalPrice), 2) AS Revenue,
    ROUND(AVG(TotalPrice), 2) AS Avg_Transaction
FROM transactions
GROUP BY Country
ORDER BY Revenue DESC, Country;
";

const DAY_OF_WEEK: &str = "
SELECT
    DayOfWeek,
    COUNT(DISTINCT InvoiceNo) AS Orders,
    ROUND(SUM(TotalPrice), 2) AS Revenue,
    ROUND(AVG(TotalPrice), 2) AS Avg_Transaction
FROM transactions
GROUP BY DayOfWeek
ORDER BY
    CASE DayOfWeek
        WHEN 'Monday' THEN 1
        WHEN 'Tuesday' THEN 2
        WHEN 'Wednesday' THEN 3
        WHEN 'Thursday' THEN 4
        WHEN 'Friday' THEN 5
        WHEN 'Saturday' THEN 6
        WHEN 'Sunday' THEN 7
    END;
";

const QUARTERLY_PERFORMANCE: &str = "
SELECT
    Year,
    Quarter,
    COUNT(DISTINCT InvoiceNo) AS Orders,
    COUNT(DISTINCT CustomerID) AS Customers,
    ROUND(SUM(TotalPrice), 2) AS Revenue
FROM transactions
GROUP BY Year, Quarter
ORDER BY Year, Quarter;
";

const PURCHASE_FREQUENCY: &str = "
WITH customer_stats AS (
    SELECT
        CustomerID,
        COUNT(DISTINCT InvoiceNo) AS Order_Count,
        SUM(TotalPrice) AS Total_Revenue
    FROM transactions
    GROUP BY CustomerID
),
bucketed AS (
    SELECT
        CASE
            WHEN Order_Count = 1 THEN '1 Order'
            WHEN Order_Count BETWEEN 2 AND 5 THEN '2-5 Orders'
            WHEN Order_Count BETWEEN 6 AND 10 THEN '6-10 Orders'
            WHEN Order_Count BETWEEN 11 AND 20 THEN '11-20 Orders'
            ELSE '20+ Orders'
        END AS Purchase_Frequency,
        CASE
            WHEN Order_Count = 1 THEN 1
            WHEN Order_Count BETWEEN 2 AND 5 THEN 2
            WHEN Order_Count BETWEEN 6 AND 10 THEN 3
            WHEN Order_Count BETWEEN 11 AND 20 THEN 4
            ELSE 5
        END AS Bucket_Order,
        Total_Revenue
    FROM customer_stats
)
SELECT
    Purchase_Frequency,
    COUNT(*) AS Number_of_Customers,
    ROUND(SUM(Total_Revenue), 2) AS Total_Revenue,
    ROUND(AVG(Total_Revenue), 2) AS Avg_Customer_Value
FROM bucketed
GROUP BY Purchase_Frequency, Bucket_Order
ORDER BY Bucket_Order;
";

/// Pairs are only formed with `t1.Description < t2.Description`, so each
/// unordered pair shows up once and never against itself.
fn product_affinity(min_support: u32) -> String {
    format!(
        "
WITH ProductPairs AS (
    SELECT
        t1.Description AS Product_A,
        t2.Description AS Product_B,
        COUNT(DISTINCT t1.InvoiceNo) AS Times_Bought_Together
    FROM transactions t1
    JOIN transactions t2
        ON t1.InvoiceNo = t2.InvoiceNo
        AND t1.Description < t2.Description
    GROUP BY t1.Description, t2.Description
)
SELECT
    Product_A,
    Product_B,
    Times_Bought_Together
FROM ProductPairs
WHERE Times_Bought_Together >= {min_support}
ORDER BY Times_Bought_Together DESC, Product_A, Product_B
LIMIT 20;
"
    )
}

/// Days since a customer's last purchase are counted from the fixed
/// reference date, rounded to whole days, then bucketed at 30/60/90.
fn churn_analysis(config: &ReportConfig) -> String {
    let reference = config.reference_date.format("%Y-%m-%d");
    format!(
        "
WITH LastPurchase AS (
    SELECT
        CustomerID,
        MAX(InvoiceDate) AS Last_Purchase_Date,
        ROUND(
            date_diff('second', MAX(InvoiceDate), TIMESTAMP '{reference} 00:00:00')
                / 86400.0::DOUBLE,
            0
        ) AS Days_Since_Purchase,
        COUNT(DISTINCT InvoiceNo) AS Total_Orders,
        ROUND(SUM(TotalPrice), 2) AS Total_Revenue
    FROM transactions
    GROUP BY CustomerID
),
classified AS (
    SELECT
        CASE
            WHEN Days_Since_Purchase <= 30 THEN 'Active'
            WHEN Days_Since_Purchase <= 60 THEN 'At Risk'
            WHEN Days_Since_Purchase <= 90 THEN 'Churning'
            ELSE 'Churned'
        END AS Customer_Status,
        CASE
            WHEN Days_Since_Purchase <= 30 THEN 1
            WHEN Days_Since_Purchase <= 60 THEN 2
            WHEN Days_Since_Purchase <= 90 THEN 3
            ELSE 4
        END AS Status_Order,
        Total_Revenue
    FROM LastPurchase
)
SELECT
    Customer_Status,
    COUNT(*) AS Number_of_Customers,
    ROUND(SUM(Total_Revenue), 2) AS Total_Revenue,
    ROUND(AVG(Total_Revenue), 2) AS Avg_Customer_Value
FROM classified
GROUP BY Customer_Status, Status_Order
ORDER BY Status_Order;
"
    )
}

/// The ten report queries, in the order they run.
pub fn report_queries(config: &ReportConfig) -> Vec<ReportQuery> {
    vec![
        ReportQuery::new("1. BUSINESS OVERVIEW", BUSINESS_OVERVIEW),
        ReportQuery::new("2. MONTHLY TRENDS", MONTHLY_TRENDS),
        ReportQuery::new("3. TOP 20 PRODUCTS", TOP_PRODUCTS),
        ReportQuery::new("4. TOP 30 CUSTOMERS", TOP_CUSTOMERS).with_row_cap(30),
        ReportQuery::new("5. GEOGRAPHIC PERFORMANCE", GEOGRAPHIC_PERFORMANCE),
        ReportQuery::new("6. DAY OF WEEK ANALYSIS", DAY_OF_WEEK),
        ReportQuery::new("7. QUARTERLY PERFORMANCE", QUARTERLY_PERFORMANCE),
        ReportQuery::new("8. CUSTOMER PURCHASE FREQUENCY", PURCHASE_FREQUENCY),
        ReportQuery::new(
            "9. PRODUCT AFFINITY (Top 20)",
            product_affinity(config.min_pair_support),
        ),
        ReportQuery::new("10. CUSTOMER CHURN ANALYSIS", churn_analysis(config)),
    ]
}
