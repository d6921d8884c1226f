/*!

This is the long-form manual for `tideman_tally`.

## What is counted

For an agenda of N candidates, the tally holds one counter for each ordered
pair of distinct candidates: N(N-1) counters in total. The counter for
`(A, B)` is the number of ballots that rank `A` strictly above `B`. A ballot
with a count of `k` stands for `k` identical ballots and adds `k` instead
of 1.

The counters are enumerated in agenda order for both positions. With the
agenda `[Alice, Bob, Carol]`, the order is:

|   | winner | loser |
|---|--------|-------|
| 1 | Alice  | Bob   |
| 2 | Alice  | Carol |
| 3 | Bob    | Alice |
| 4 | Bob    | Carol |
| 5 | Carol  | Alice |
| 6 | Carol  | Bob   |

This is also the order of iteration and of serialization of the registry.

## Ballots

A ballot is a list of rank-groups. The first group holds the most preferred
candidates. Candidates in the same group are tied: the ballot does not count
toward either direction of the pair.

|         | rank 0 | rank 1       | rank 2 |
|---------|--------|--------------|--------|
| ballot  | Bob    | Alice, Carol |        |

This ballot counts for `(Bob, Alice)` and for `(Bob, Carol)`, and for
nothing else.

A ballot that mentions the same candidate twice, in the same group or in
different groups, is invalid: the tally fails with
`TallyError::DuplicateCandidate` and this ballot contributes nothing.

A ballot that mentions a candidate outside the agenda fails with
`TallyError::CandidateNotFound`.

## Configuration

The only rule concerns the candidates that a ballot does not rank at all.
It is controlled by `TallyRules::unranked_candidate_mode`:

- `skip` (default): a pair in which one of the candidates is not ranked is
  ignored for this ballot. The ballot still counts for all the pairs in
  which both candidates are ranked.
- `fail`: every ballot must rank every candidate of the agenda. A ballot
  that does not fails with `TallyError::UnrankedCandidate`.

The rules can be embedded in a JSON configuration:

```json
{ "unrankedCandidateMode": "fail" }
```

## Errors

All the errors are violations of the input contract. A failing ballot
aborts the whole calculation and leaves no partial count in the registry.
Callers that would rather skip bad ballots can call
`TallyEngine::tally_ballot` for each ballot and decide what to do with each
error.

## Splitting the work

The tally is additive. Disjoint batches of ballots can be counted in
separate registries (for example on separate threads) and combined with
`PairTallyRegistry::merge`. The result is the same as counting all the
ballots at once, whatever the order of the batches.

 */
